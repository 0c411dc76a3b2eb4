//! Forecast transformer
//!
//! Pure functions that turn a [`Snapshot`] into display-ready views: condition
//! translation, wind bucketing, daily and hourly forecasts, and the
//! natural-language precipitation summary.

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use domain::DomainError;
use domain::entities::{AirQuality, Alert, DayPart, HourlyRecord, Snapshot};
use domain::value_objects::{ConditionCode, IconKey, Language, NativeUnits, WindDirection, WindScale};
use serde::Serialize;

/// Precipitation above this value counts as rain
pub const RAIN_THRESHOLD: f64 = 0.1;

/// A snapshot older than this is reported unavailable
pub const AVAILABILITY_WINDOW_SECS: i64 = 1800;

/// Opening clauses count hours up to this index; later ones name the hour
const HOURS_LATER_LIMIT: usize = 3;

/// Icon key for a raw condition code
pub fn condition(code: &str) -> Result<IconKey, DomainError> {
    Ok(code.parse::<ConditionCode>()?.icon())
}

/// Localized label for a raw condition code
pub fn localized_condition(code: &str, language: Language) -> Result<&'static str, DomainError> {
    Ok(code.parse::<ConditionCode>()?.label(language))
}

/// Compass label for a bearing in degrees
#[must_use]
pub fn wind_direction_label(degrees: f64, language: Language) -> &'static str {
    WindDirection::from_degrees(degrees).label(language)
}

/// Wind scale for a speed in km/h
#[must_use]
pub fn wind_scale_level(speed_kmh: f64) -> WindScale {
    WindScale::from_speed_kmh(speed_kmh)
}

/// Wind scale with its texts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindScaleView {
    /// `0` to `16`, or `17+`
    pub level: String,
    pub label: &'static str,
    pub description: &'static str,
}

impl WindScaleView {
    #[must_use]
    pub fn new(scale: WindScale, language: Language) -> Self {
        Self {
            level: scale.to_string(),
            label: scale.label(language),
            description: scale.description(language),
        }
    }
}

/// Wind in native units with derived labels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindView {
    pub speed: f64,
    pub bearing: f64,
    pub direction: &'static str,
    pub scale: WindScaleView,
}

impl WindView {
    fn from_snapshot(snapshot: &Snapshot, speed: f64, bearing: f64, language: Language) -> Self {
        let speed_kmh = snapshot.unit_system.wind_speed_kmh(speed);
        Self {
            speed,
            bearing,
            direction: wind_direction_label(bearing, language),
            scale: WindScaleView::new(wind_scale_level(speed_kmh), language),
        }
    }
}

/// One day of the daily forecast
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayForecast {
    pub date: NaiveDate,
    pub condition: IconKey,
    pub skycon: String,
    pub localized_condition: &'static str,
    /// Average precipitation
    pub precipitation: f64,
    /// Maximum temperature, truncated
    pub temperature: i64,
    /// Minimum temperature, truncated
    pub templow: i64,
    pub wind: WindView,
    /// 08h-20h breakdown
    pub day: DayPart,
    /// 20h-32h breakdown
    pub night: DayPart,
}

/// Daily forecast, one entry per daily record
pub fn daily_forecast(
    snapshot: &Snapshot,
    language: Language,
) -> Result<Vec<DayForecast>, DomainError> {
    snapshot
        .weather
        .daily
        .iter()
        .map(|day| {
            let code = day.skycon.parse::<ConditionCode>()?;
            let date_part = day.date.get(..10).unwrap_or(&day.date);
            let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
                .map_err(|e| DomainError::InvalidDateTime(format!("{}: {e}", day.date)))?;
            Ok(DayForecast {
                date,
                condition: code.icon(),
                skycon: day.skycon.clone(),
                localized_condition: code.label(language),
                precipitation: day.precipitation.avg,
                temperature: day.temperature.max.trunc() as i64,
                templow: day.temperature.min.trunc() as i64,
                wind: WindView::from_snapshot(
                    snapshot,
                    day.wind.avg.speed,
                    day.wind.avg.direction,
                    language,
                ),
                day: day.day.clone(),
                night: day.night.clone(),
            })
        })
        .collect()
}

/// One hour of the hourly forecast
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourForecast {
    /// `YYYY-MM-DD HH:MM` in the location's local time
    pub datetime: String,
    pub condition: IconKey,
    pub skycon: String,
    pub localized_condition: &'static str,
    /// Rounded temperature
    pub temperature: i64,
    /// Humidity rounded to two decimals
    pub humidity: f64,
    pub cloudrate: f64,
    pub wind: WindView,
    pub visibility: f64,
    pub aqi: f64,
    pub pm25: f64,
    pub precipitation: f64,
    /// Rounded percentage, absent when zero or not reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precipitation_probability: Option<u32>,
}

/// Hourly forecast with its precipitation summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyForecast {
    pub hours: Vec<HourForecast>,
    pub summary: String,
}

/// Hourly forecast plus the precipitation summary relative to `now`
pub fn hourly_forecast(
    snapshot: &Snapshot,
    now: DateTime<Utc>,
    language: Language,
) -> Result<HourlyForecast, DomainError> {
    let records = &snapshot.weather.hourly.records;
    let hours = records
        .iter()
        .map(|record| hour_forecast(snapshot, record, language))
        .collect::<Result<Vec<_>, _>>()?;
    let now_hour = now.with_timezone(&snapshot.weather.local_offset()).hour();
    let summary = precipitation_summary(records, now_hour, language)?;
    Ok(HourlyForecast { hours, summary })
}

fn hour_forecast(
    snapshot: &Snapshot,
    record: &HourlyRecord,
    language: Language,
) -> Result<HourForecast, DomainError> {
    let code = record.skycon.parse::<ConditionCode>()?;
    let probability = record
        .precipitation_probability
        .map(|p| p.round() as u32)
        .filter(|p| *p > 0);
    Ok(HourForecast {
        datetime: record.datetime.format("%Y-%m-%d %H:%M").to_string(),
        condition: code.icon(),
        skycon: record.skycon.clone(),
        localized_condition: code.label(language),
        temperature: record.temperature.round() as i64,
        humidity: (record.humidity * 100.0).round() / 100.0,
        cloudrate: record.cloudrate,
        wind: WindView::from_snapshot(snapshot, record.wind.speed, record.wind.direction, language),
        visibility: record.visibility,
        aqi: record.aqi,
        pm25: record.pm25,
        precipitation: record.precipitation,
        precipitation_probability: probability,
    })
}

/// Phrase set for the precipitation summary
struct Phrases {
    today: &'static str,
    tomorrow: &'static str,
    separator: &'static str,
    no_rain: &'static str,
}

impl Phrases {
    const fn for_language(language: Language) -> Self {
        match language {
            Language::Zh => Self {
                today: "今天",
                tomorrow: "明天",
                separator: "",
                no_rain: "未来24小时内无降水",
            },
            Language::En => Self {
                today: "today",
                tomorrow: "tomorrow",
                separator: " ",
                no_rain: "no precipitation expected in the next 24 hours.",
            },
        }
    }

    /// Calendar-naive: only the hour of day is compared
    const fn day(&self, hour: u32, now_hour: u32) -> &'static str {
        if hour > now_hour { self.today } else { self.tomorrow }
    }
}

fn hours_later(language: Language, hours: usize, condition: &str) -> String {
    match language {
        Language::Zh => format!("{hours}小时后转{condition}。"),
        Language::En => format!("{hours} hours later becomes {condition}."),
    }
}

fn becomes_at(language: Language, day: &str, hour: u32, condition: &str) -> String {
    match language {
        Language::Zh => format!("{day}{hour}点后转{condition}。"),
        Language::En => format!("{day} at {hour} becomes {condition}."),
    }
}

fn peaks_at(language: Language, day: &str, hour: u32, condition: &str) -> String {
    match language {
        Language::Zh => format!("{day}{hour}点为{condition}！"),
        Language::En => format!("{day} at {hour} is {condition}!"),
    }
}

/// Natural-language summary of the rain window in an hourly series
///
/// Walks the hours in order and builds up to three clauses:
/// an opening clause at the first rainy hour after index 0, a peak clause
/// replaced on every new precipitation maximum (which also drops any closing
/// clause), and a closing clause at the first hour precipitation returns to
/// exactly zero. Hours later than `now_hour` are labelled today, the rest
/// tomorrow.
pub fn precipitation_summary(
    records: &[HourlyRecord],
    now_hour: u32,
    language: Language,
) -> Result<String, DomainError> {
    let phrases = Phrases::for_language(language);
    let mut opening: Option<String> = None;
    let mut peak: Option<String> = None;
    let mut closing: Option<String> = None;
    let mut closed = false;
    let mut max_precipitation = 0.0_f64;

    for (index, record) in records.iter().enumerate() {
        let precipitation = record.precipitation;
        let hour = record.datetime.hour();
        let day = phrases.day(hour, now_hour);

        if precipitation > RAIN_THRESHOLD && index > 0 && opening.is_none() {
            let label = localized_condition(&record.skycon, language)?;
            opening = Some(if index <= HOURS_LATER_LIMIT {
                hours_later(language, index, label)
            } else {
                becomes_at(language, day, hour, label)
            });
            max_precipitation = precipitation;
        }

        if precipitation > RAIN_THRESHOLD && precipitation > max_precipitation {
            let label = localized_condition(&record.skycon, language)?;
            peak = Some(peaks_at(language, day, hour, label));
            max_precipitation = precipitation;
            closing = None;
        }

        #[allow(clippy::float_cmp)] // exact zero marks a dry hour
        let dry = precipitation == 0.0;
        if dry && max_precipitation > 0.0 && !closed {
            let label = localized_condition(&record.skycon, language)?;
            closing = Some(becomes_at(language, day, hour, label));
            closed = true;
        }
    }

    let Some(opening) = opening else {
        return Ok(phrases.no_rain.to_string());
    };
    let clauses: Vec<String> = [Some(opening), peak, closing].into_iter().flatten().collect();
    Ok(clauses.join(phrases.separator))
}

/// Current conditions with derived labels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub condition: IconKey,
    pub skycon: String,
    pub localized_condition: &'static str,
    pub temperature: f64,
    pub apparent_temperature: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Pressure in the native unit (hPa for metric)
    pub pressure: f64,
    pub wind: WindView,
    pub visibility: f64,
    pub air_quality: AirQuality,
    pub forecast_keypoint: String,
    pub minutely_description: String,
    pub minutely_probability: Vec<f64>,
    pub hourly_description: String,
    pub alerts: Vec<Alert>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub update_time: DateTime<Utc>,
    pub units: NativeUnits,
}

/// Current conditions view of a snapshot
pub fn current_conditions(
    snapshot: &Snapshot,
    language: Language,
) -> Result<CurrentConditions, DomainError> {
    let weather = &snapshot.weather;
    let realtime = &weather.realtime;
    let code = realtime.skycon.parse::<ConditionCode>()?;
    Ok(CurrentConditions {
        condition: code.icon(),
        skycon: realtime.skycon.clone(),
        localized_condition: code.label(language),
        temperature: realtime.temperature,
        apparent_temperature: realtime.apparent_temperature,
        humidity: (realtime.humidity * 100.0).round(),
        pressure: snapshot.unit_system.native_pressure(realtime.pressure),
        wind: WindView::from_snapshot(
            snapshot,
            realtime.wind.speed,
            realtime.wind.direction,
            language,
        ),
        visibility: realtime.visibility,
        air_quality: realtime.air_quality.clone(),
        forecast_keypoint: weather.forecast_keypoint.clone(),
        minutely_description: weather.minutely.description.clone(),
        minutely_probability: weather.minutely.probability.clone(),
        hourly_description: weather.hourly.description.clone(),
        alerts: weather.alerts.clone(),
        city: weather.city().map(str::to_string),
        update_time: weather.server_time,
        units: snapshot.unit_system.native_units(),
    })
}

/// Whether the snapshot is recent enough to be shown
#[must_use]
pub fn is_available(snapshot: &Snapshot, now: DateTime<Utc>) -> bool {
    snapshot.weather.age_secs(now) < AVAILABILITY_WINDOW_SECS
}
