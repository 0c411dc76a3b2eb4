//! CaiYun API data models
//!
//! Wire types of the `weather.json` and `lifeindex` endpoints. Series are kept
//! column-wise exactly as the API sends them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope of the `weather.json` endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherResponse {
    /// `ok` on success, `failed` otherwise
    pub status: String,
    /// Error message when `status` is not `ok`
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub api_status: String,
    /// Unit tag echoed back (`metric:v2`, `imperial`, ...)
    #[serde(default)]
    pub unit: String,
    /// UTC offset in seconds
    #[serde(default)]
    pub tzshift: i32,
    #[serde(default)]
    pub timezone: String,
    /// Unix timestamp of the response
    #[serde(default)]
    pub server_time: i64,
    /// `[lat, lng]`
    #[serde(default)]
    pub location: Vec<f64>,
    #[serde(default)]
    pub result: Option<WeatherResult>,
}

/// The `result` block of a forecast response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherResult {
    #[serde(default)]
    pub alert: Option<AlertBlock>,
    pub realtime: RealtimeBlock,
    #[serde(default)]
    pub minutely: MinutelyBlock,
    pub hourly: HourlyBlock,
    pub daily: DailyBlock,
    #[serde(default)]
    pub primary: i32,
    #[serde(default)]
    pub forecast_keypoint: String,
}

/// Alerts and administrative codes of the location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertBlock {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub content: Vec<AlertContent>,
    #[serde(default)]
    pub adcodes: Vec<AdcodeEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertContent {
    #[serde(rename = "alertId")]
    pub alert_id: String,
    pub title: String,
    pub code: String,
    pub status: String,
    pub description: String,
    pub source: String,
    pub location: String,
    /// Unix timestamp of publication
    pub pubtimestamp: Option<f64>,
}

/// Administrative region code; the API sends `adcode` as number or string
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdcodeEntry {
    pub adcode: Value,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WindValue {
    pub speed: f64,
    pub direction: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AqiValue {
    #[serde(default)]
    pub chn: f64,
    #[serde(default)]
    pub usa: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AqiText {
    #[serde(default)]
    pub chn: String,
    #[serde(default)]
    pub usa: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AirQualityNow {
    pub pm25: f64,
    pub pm10: f64,
    pub o3: f64,
    pub so2: f64,
    pub no2: f64,
    pub co: f64,
    pub aqi: AqiValue,
    pub description: AqiText,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LocalPrecipitation {
    #[serde(default)]
    pub intensity: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PrecipitationNow {
    #[serde(default)]
    pub local: LocalPrecipitation,
}

/// Current conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeBlock {
    pub temperature: f64,
    #[serde(default)]
    pub apparent_temperature: f64,
    pub humidity: f64,
    #[serde(default)]
    pub cloudrate: f64,
    pub skycon: String,
    #[serde(default)]
    pub visibility: f64,
    #[serde(default)]
    pub pressure: f64,
    pub wind: WindValue,
    #[serde(default)]
    pub precipitation: PrecipitationNow,
    #[serde(default)]
    pub air_quality: AirQualityNow,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MinutelyBlock {
    pub description: String,
    pub probability: Vec<f64>,
}

/// Hourly sample keyed by `datetime`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimedValue<T = f64> {
    pub datetime: String,
    pub value: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlyPrecipitation {
    pub datetime: String,
    pub value: f64,
    #[serde(default)]
    pub probability: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlyWind {
    pub datetime: String,
    pub speed: f64,
    pub direction: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AirQualityHourly {
    pub aqi: Vec<TimedValue<AqiValue>>,
    pub pm25: Vec<TimedValue>,
}

/// Hourly series, one column per quantity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HourlyBlock {
    pub status: String,
    pub description: String,
    pub precipitation: Vec<HourlyPrecipitation>,
    pub temperature: Vec<TimedValue>,
    pub apparent_temperature: Vec<TimedValue>,
    pub humidity: Vec<TimedValue>,
    pub cloudrate: Vec<TimedValue>,
    pub skycon: Vec<TimedValue<String>>,
    pub wind: Vec<HourlyWind>,
    pub visibility: Vec<TimedValue>,
    pub air_quality: AirQualityHourly,
}

/// Daily sample keyed by `date`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatedValue<T = f64> {
    pub date: String,
    pub value: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyRange {
    pub date: String,
    pub max: f64,
    pub min: f64,
    pub avg: f64,
    #[serde(default)]
    pub probability: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyWindRange {
    pub date: String,
    pub max: WindValue,
    pub min: WindValue,
    pub avg: WindValue,
}

/// Daily series, one column per quantity and day part
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyBlock {
    pub status: String,
    pub precipitation: Vec<DailyRange>,
    pub precipitation_08h_20h: Vec<DailyRange>,
    pub precipitation_20h_32h: Vec<DailyRange>,
    pub temperature: Vec<DailyRange>,
    pub temperature_08h_20h: Vec<DailyRange>,
    pub temperature_20h_32h: Vec<DailyRange>,
    pub wind: Vec<DailyWindRange>,
    pub wind_08h_20h: Vec<DailyWindRange>,
    pub wind_20h_32h: Vec<DailyWindRange>,
    pub skycon: Vec<DatedValue<String>>,
    pub skycon_08h_20h: Vec<DatedValue<String>>,
    pub skycon_20h_32h: Vec<DatedValue<String>>,
    /// Category name to per-day slots
    pub life_index: BTreeMap<String, Value>,
}

/// Envelope of the `lifeindex` endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LifeIndexResponse {
    #[serde(default)]
    pub status: String,
    /// Category name to per-day slots; absent or empty when the feed has nothing
    #[serde(default)]
    pub result: Option<BTreeMap<String, Value>>,
}

impl LifeIndexResponse {
    /// Categories of the feed, `None` if the response carried no result
    #[must_use]
    pub fn categories(&self) -> Option<&BTreeMap<String, Value>> {
        self.result.as_ref().filter(|result| !result.is_empty())
    }
}
