//! Weather payload entities
//!
//! Typed form of one primary forecast response. Series are stored row-wise:
//! every [`HourlyRecord`] and [`DailyRecord`] describes a single hour or day,
//! so sub-fields can never drift out of alignment once constructed.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use super::RawLifeIndex;
use crate::errors::DomainError;

/// Wind speed (native unit) and bearing in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
    pub direction: f64,
}

/// Max/min/avg aggregate of a daily value
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueRange {
    pub max: f64,
    pub min: f64,
    pub avg: f64,
    /// Only reported for precipitation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
}

/// Max/min/avg wind of a day
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WindRange {
    pub max: Wind,
    pub min: Wind,
    pub avg: Wind,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AqiPair {
    pub chn: f64,
    pub usa: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AqiDescription {
    pub chn: String,
    pub usa: String,
}

/// Air quality sub-indices
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AirQuality {
    pub pm25: f64,
    pub pm10: f64,
    pub o3: f64,
    pub so2: f64,
    pub no2: f64,
    pub co: f64,
    pub aqi: AqiPair,
    pub description: AqiDescription,
}

/// Current conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Realtime {
    pub temperature: f64,
    pub apparent_temperature: f64,
    /// Relative humidity as a fraction (0.0 to 1.0)
    pub humidity: f64,
    pub cloudrate: f64,
    /// Raw sky condition code
    pub skycon: String,
    pub visibility: f64,
    /// Pressure as reported by the API (Pa in metric)
    pub pressure: f64,
    pub wind: Wind,
    pub precipitation_intensity: f64,
    pub air_quality: AirQuality,
}

/// Minute-level precipitation outlook
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Minutely {
    pub description: String,
    /// Probability for each upcoming half hour
    pub probability: Vec<f64>,
}

/// One forecast hour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyRecord {
    pub datetime: DateTime<FixedOffset>,
    pub precipitation: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation_probability: Option<f64>,
    pub temperature: f64,
    pub apparent_temperature: f64,
    pub humidity: f64,
    pub cloudrate: f64,
    pub skycon: String,
    pub wind: Wind,
    pub visibility: f64,
    pub aqi: f64,
    pub pm25: f64,
}

/// Hourly series with its textual description
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HourlySeries {
    pub description: String,
    pub records: Vec<HourlyRecord>,
}

/// Daytime (08h-20h) or nighttime (20h-32h) breakdown of a day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPart {
    pub skycon: String,
    pub temperature: ValueRange,
    pub wind: WindRange,
    pub precipitation: ValueRange,
}

/// One forecast day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Date string as sent by the API (`YYYY-MM-DDT00:00+08:00`)
    pub date: String,
    pub skycon: String,
    pub temperature: ValueRange,
    pub precipitation: ValueRange,
    pub wind: WindRange,
    pub day: DayPart,
    pub night: DayPart,
}

/// An active weather alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub alert_id: String,
    pub title: String,
    pub code: String,
    pub status: String,
    pub description: String,
    pub source: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

/// Administrative region covering the location (country down to district)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRegion {
    pub adcode: String,
    pub name: String,
}

/// Typed primary forecast response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherPayload {
    pub server_time: DateTime<Utc>,
    pub api_version: String,
    pub timezone: String,
    /// UTC offset of the location in seconds
    pub tzshift: i32,
    pub forecast_keypoint: String,
    pub realtime: Realtime,
    pub minutely: Minutely,
    pub hourly: HourlySeries,
    pub daily: Vec<DailyRecord>,
    #[serde(default)]
    pub alerts: Vec<Alert>,
    #[serde(default)]
    pub regions: Vec<AdminRegion>,
    /// Life index shipped inside the daily block, used when the dedicated feed has none
    #[serde(default)]
    pub daily_life_index: RawLifeIndex,
}

impl WeatherPayload {
    /// UTC offset of the forecast location
    #[must_use]
    pub fn local_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.tzshift).unwrap_or_else(|| Utc.fix())
    }

    /// Name of the most specific administrative region, if any
    #[must_use]
    pub fn city(&self) -> Option<&str> {
        self.regions.last().map(|region| region.name.as_str())
    }

    /// Seconds elapsed since the server produced this payload
    #[must_use]
    pub fn age_secs(&self, now: DateTime<Utc>) -> i64 {
        (now - self.server_time).num_seconds()
    }
}

/// Check that the columns of one series share a length and return it
///
/// `columns` pairs a column name with its length; the first column is the reference.
pub fn aligned_len(series: &str, columns: &[(&str, usize)]) -> Result<usize, DomainError> {
    let Some(&(reference, expected)) = columns.first() else {
        return Ok(0);
    };
    for &(name, len) in &columns[1..] {
        if len != expected {
            return Err(DomainError::malformed(format!(
                "{series}.{name} has {len} entries but {series}.{reference} has {expected}"
            )));
        }
    }
    Ok(expected)
}
