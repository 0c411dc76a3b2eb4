//! ColorfulClouds weather integration
//!
//! Client for the ColorfulClouds (CaiYun) Weather API (<https://docs.caiyunapp.com>).
//! Provides the primary forecast endpoint and the life index feed.

pub mod client;
mod models;

pub use client::{CaiyunApi, CaiyunClient, CaiyunConfig, CaiyunError, WeatherQuery};
pub use models::{
    AdcodeEntry, AirQualityHourly, AirQualityNow, AlertBlock, AlertContent, AqiText, AqiValue,
    DailyBlock, DailyRange, DailyWindRange, DatedValue, HourlyBlock, HourlyPrecipitation,
    HourlyWind, LifeIndexResponse, LocalPrecipitation, MinutelyBlock, PrecipitationNow,
    RealtimeBlock, TimedValue, WeatherResponse, WeatherResult, WindValue,
};
