//! CaiYun adapter - Implements WeatherProviderPort using integration_caiyun
//!
//! Converts the column-wise wire format into row-wise domain records. Every
//! column of a series must have the same length; a mismatch is reported as a
//! malformed payload instead of being truncated.

use std::collections::BTreeMap;
use std::time::Duration;

use application::error::{ApplicationError, RequestKind};
use application::ports::{ForecastRequest, WeatherProviderPort};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use domain::DomainError;
use domain::entities::{
    AdminRegion, AirQuality, AqiDescription, AqiPair, Alert, DailyRecord, DayPart, HourlyRecord,
    HourlySeries, LifeIndexSlot, Minutely, RawLifeIndex, Realtime, ValueRange, WeatherPayload,
    Wind, WindRange, aligned_len,
};
use domain::value_objects::GeoLocation;
use integration_caiyun::{
    AdcodeEntry, AlertContent, CaiyunApi, CaiyunClient, CaiyunConfig, CaiyunError, DailyBlock,
    DailyRange, DailyWindRange, HourlyBlock, RealtimeBlock, WeatherQuery, WeatherResponse,
    WindValue,
};
use serde_json::Value;
use tracing::{debug, instrument};

/// Life index key that carries feed metadata rather than a category
const META_KEY: &str = "meta";

/// Adapter for the ColorfulClouds (CaiYun) weather API
#[derive(Debug)]
pub struct CaiyunWeatherAdapter {
    client: CaiyunClient,
    timeout: Duration,
}

impl CaiyunWeatherAdapter {
    /// Create an adapter with the given client configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn new(config: CaiyunConfig) -> Result<Self, ApplicationError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client =
            CaiyunClient::new(config).map_err(|e| ApplicationError::Internal(e.to_string()))?;
        Ok(Self { client, timeout })
    }

    /// Map integration error to application error
    fn map_error(&self, err: CaiyunError, request: RequestKind) -> ApplicationError {
        match err {
            CaiyunError::ConnectionFailed(e) => ApplicationError::ConnectionFailed(e),
            CaiyunError::Timeout(_) => ApplicationError::Timeout {
                request,
                after: self.timeout,
            },
            CaiyunError::RequestFailed(e) | CaiyunError::ServiceUnavailable(e) => {
                ApplicationError::ExternalService(e)
            },
            CaiyunError::RateLimitExceeded => {
                ApplicationError::ExternalService("rate limit exceeded".into())
            },
            CaiyunError::ApiStatus { status, message } => {
                ApplicationError::ExternalService(format!("API status {status}: {message}"))
            },
            CaiyunError::ParseError(e) => ApplicationError::MalformedPayload(e),
            CaiyunError::InvalidCoordinates => {
                ApplicationError::Domain(DomainError::ValidationError("Invalid coordinates".into()))
            },
        }
    }
}

#[async_trait]
impl WeatherProviderPort for CaiyunWeatherAdapter {
    #[instrument(skip(self), fields(location = %request.location))]
    async fn fetch_forecast(
        &self,
        request: &ForecastRequest,
    ) -> Result<WeatherPayload, ApplicationError> {
        let query = WeatherQuery {
            latitude: request.location.latitude(),
            longitude: request.location.longitude(),
            daily_steps: request.daily_steps,
            hourly_steps: request.hourly_steps,
            alert: request.alert,
            unit: request.unit_system.api_tag().to_string(),
            timestamp: request.timestamp.timestamp(),
        };

        let response = self
            .client
            .get_weather(&query)
            .await
            .map_err(|e| self.map_error(e, RequestKind::Forecast))?;

        let payload = map_weather(response)?;
        debug!(
            hours = payload.hourly.records.len(),
            days = payload.daily.len(),
            alerts = payload.alerts.len(),
            "Mapped forecast payload"
        );
        Ok(payload)
    }

    #[instrument(skip(self), fields(location = %location))]
    async fn fetch_life_index(
        &self,
        location: &GeoLocation,
    ) -> Result<Option<RawLifeIndex>, ApplicationError> {
        let response = self
            .client
            .get_life_index(location.latitude(), location.longitude())
            .await
            .map_err(|e| self.map_error(e, RequestKind::LifeIndex))?;

        match response.categories() {
            Some(categories) => Ok(Some(map_life_index(categories)?)),
            None => {
                debug!("Life index feed returned no result");
                Ok(None)
            },
        }
    }
}

/// Convert a forecast response into the domain payload
fn map_weather(response: WeatherResponse) -> Result<WeatherPayload, ApplicationError> {
    let result = response
        .result
        .ok_or_else(|| ApplicationError::MalformedPayload("missing result block".into()))?;

    let server_time = DateTime::<Utc>::from_timestamp(response.server_time, 0).ok_or_else(|| {
        DomainError::InvalidDateTime(format!("server_time {}", response.server_time))
    })?;

    let (alerts, regions) = match result.alert {
        Some(block) => (
            block.content.iter().map(map_alert).collect(),
            block.adcodes.iter().map(map_region).collect(),
        ),
        None => (Vec::new(), Vec::new()),
    };

    Ok(WeatherPayload {
        server_time,
        api_version: response.api_version,
        timezone: response.timezone,
        tzshift: response.tzshift,
        forecast_keypoint: result.forecast_keypoint,
        realtime: map_realtime(result.realtime),
        minutely: Minutely {
            description: result.minutely.description,
            probability: result.minutely.probability,
        },
        hourly: map_hourly(result.hourly)?,
        daily_life_index: map_life_index(&result.daily.life_index)?,
        daily: map_daily(&result.daily)?,
        alerts,
        regions,
    })
}

const fn map_wind(wind: WindValue) -> Wind {
    Wind {
        speed: wind.speed,
        direction: wind.direction,
    }
}

fn map_realtime(realtime: RealtimeBlock) -> Realtime {
    let air = realtime.air_quality;
    Realtime {
        temperature: realtime.temperature,
        apparent_temperature: realtime.apparent_temperature,
        humidity: realtime.humidity,
        cloudrate: realtime.cloudrate,
        skycon: realtime.skycon,
        visibility: realtime.visibility,
        pressure: realtime.pressure,
        wind: map_wind(realtime.wind),
        precipitation_intensity: realtime.precipitation.local.intensity,
        air_quality: AirQuality {
            pm25: air.pm25,
            pm10: air.pm10,
            o3: air.o3,
            so2: air.so2,
            no2: air.no2,
            co: air.co,
            aqi: AqiPair {
                chn: air.aqi.chn,
                usa: air.aqi.usa,
            },
            description: AqiDescription {
                chn: air.description.chn,
                usa: air.description.usa,
            },
        },
    }
}

/// Parse hourly timestamps such as `2024-05-01T10:00+08:00`
fn parse_hour(raw: &str) -> Result<DateTime<FixedOffset>, DomainError> {
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M%:z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map_err(|e| DomainError::InvalidDateTime(format!("{raw}: {e}")))
}

/// Value of an optional column at `index`, zero when the column is absent
fn column_value<T>(column: &[T], index: usize, value: impl Fn(&T) -> f64) -> f64 {
    column.get(index).map_or(0.0, value)
}

fn map_hourly(block: HourlyBlock) -> Result<HourlySeries, ApplicationError> {
    let mut columns = vec![
        ("precipitation", block.precipitation.len()),
        ("temperature", block.temperature.len()),
        ("humidity", block.humidity.len()),
        ("skycon", block.skycon.len()),
        ("wind", block.wind.len()),
    ];
    // Optional columns only have to line up when the API sent them
    for (name, len) in [
        ("apparent_temperature", block.apparent_temperature.len()),
        ("cloudrate", block.cloudrate.len()),
        ("visibility", block.visibility.len()),
        ("air_quality.aqi", block.air_quality.aqi.len()),
        ("air_quality.pm25", block.air_quality.pm25.len()),
    ] {
        if len > 0 {
            columns.push((name, len));
        }
    }
    let len = aligned_len("hourly", &columns)?;

    let mut records = Vec::with_capacity(len);
    for (index, precipitation) in block.precipitation.iter().enumerate() {
        let skycon = &block.skycon[index];
        let wind = &block.wind[index];
        records.push(HourlyRecord {
            datetime: parse_hour(&precipitation.datetime)?,
            precipitation: precipitation.value,
            precipitation_probability: precipitation.probability,
            temperature: block.temperature[index].value,
            apparent_temperature: column_value(&block.apparent_temperature, index, |v| v.value),
            humidity: block.humidity[index].value,
            cloudrate: column_value(&block.cloudrate, index, |v| v.value),
            skycon: skycon.value.clone(),
            wind: Wind {
                speed: wind.speed,
                direction: wind.direction,
            },
            visibility: column_value(&block.visibility, index, |v| v.value),
            aqi: column_value(&block.air_quality.aqi, index, |v| v.value.chn),
            pm25: column_value(&block.air_quality.pm25, index, |v| v.value),
        });
    }

    Ok(HourlySeries {
        description: block.description,
        records,
    })
}

const fn map_range(range: &DailyRange) -> ValueRange {
    ValueRange {
        max: range.max,
        min: range.min,
        avg: range.avg,
        probability: range.probability,
    }
}

const fn map_wind_range(range: &DailyWindRange) -> WindRange {
    WindRange {
        max: map_wind(range.max),
        min: map_wind(range.min),
        avg: map_wind(range.avg),
    }
}

fn map_daily(block: &DailyBlock) -> Result<Vec<DailyRecord>, ApplicationError> {
    let len = aligned_len(
        "daily",
        &[
            ("skycon", block.skycon.len()),
            ("temperature", block.temperature.len()),
            ("precipitation", block.precipitation.len()),
            ("wind", block.wind.len()),
            ("skycon_08h_20h", block.skycon_08h_20h.len()),
            ("skycon_20h_32h", block.skycon_20h_32h.len()),
            ("temperature_08h_20h", block.temperature_08h_20h.len()),
            ("temperature_20h_32h", block.temperature_20h_32h.len()),
            ("precipitation_08h_20h", block.precipitation_08h_20h.len()),
            ("precipitation_20h_32h", block.precipitation_20h_32h.len()),
            ("wind_08h_20h", block.wind_08h_20h.len()),
            ("wind_20h_32h", block.wind_20h_32h.len()),
        ],
    )?;

    Ok((0..len)
        .map(|i| DailyRecord {
            date: block.skycon[i].date.clone(),
            skycon: block.skycon[i].value.clone(),
            temperature: map_range(&block.temperature[i]),
            precipitation: map_range(&block.precipitation[i]),
            wind: map_wind_range(&block.wind[i]),
            day: DayPart {
                skycon: block.skycon_08h_20h[i].value.clone(),
                temperature: map_range(&block.temperature_08h_20h[i]),
                wind: map_wind_range(&block.wind_08h_20h[i]),
                precipitation: map_range(&block.precipitation_08h_20h[i]),
            },
            night: DayPart {
                skycon: block.skycon_20h_32h[i].value.clone(),
                temperature: map_range(&block.temperature_20h_32h[i]),
                wind: map_wind_range(&block.wind_20h_32h[i]),
                precipitation: map_range(&block.precipitation_20h_32h[i]),
            },
        })
        .collect())
}

fn map_alert(content: &AlertContent) -> Alert {
    Alert {
        alert_id: content.alert_id.clone(),
        title: content.title.clone(),
        code: content.code.clone(),
        status: content.status.clone(),
        description: content.description.clone(),
        source: content.source.clone(),
        location: content.location.clone(),
        published_at: content
            .pubtimestamp
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts as i64, 0)),
    }
}

fn map_region(entry: &AdcodeEntry) -> AdminRegion {
    let adcode = match &entry.adcode {
        Value::String(code) => code.clone(),
        other => other.to_string(),
    };
    AdminRegion {
        adcode,
        name: entry.name.clone(),
    }
}

/// Decode life index categories, skipping the metadata entry
fn map_life_index(categories: &BTreeMap<String, Value>) -> Result<RawLifeIndex, ApplicationError> {
    categories
        .iter()
        .filter(|(category, _)| category.as_str() != META_KEY)
        .map(|(category, slots)| {
            let slots: Vec<LifeIndexSlot> = serde_json::from_value(slots.clone()).map_err(|e| {
                ApplicationError::MalformedPayload(format!("life index category {category}: {e}"))
            })?;
            Ok((category.clone(), slots))
        })
        .collect()
}
