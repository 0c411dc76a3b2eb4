//! CaiYun weather source configuration

use std::time::Duration;

use application::CoordinatorConfig;
use domain::{GeoLocation, Language, UnitSystem};
use integration_caiyun::CaiyunConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

use super::default_true;

/// Accepted range for `daily_steps`
pub const DAILY_STEPS_RANGE: std::ops::RangeInclusive<u32> = 1..=15;

/// Accepted range for `hourly_steps`
pub const HOURLY_STEPS_RANGE: std::ops::RangeInclusive<u32> = 1..=360;

/// Accepted range for `start_offset_days`
pub const START_OFFSET_DAYS_RANGE: std::ops::RangeInclusive<i64> = 0..=15;

/// Accepted range for `poll_interval_minutes`, one minute to one day
pub const POLL_INTERVAL_MINUTES_RANGE: std::ops::RangeInclusive<u64> = 1..=1440;

/// CaiYun weather source configuration
///
/// Configured in the `[caiyun]` table of `config.toml`:
///
/// ```toml
/// [caiyun]
/// api_key = "..."
/// latitude = 31.23
/// longitude = 121.47
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaiyunAppConfig {
    /// API token
    #[serde(serialize_with = "serialize_redacted")]
    pub api_key: SecretString,

    /// Latitude (-90.0 to 90.0)
    pub latitude: f64,

    /// Longitude (-180.0 to 180.0)
    pub longitude: f64,

    /// Forecast API version
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Number of forecast days (1-15)
    #[serde(default = "default_daily_steps")]
    pub daily_steps: u32,

    /// Number of forecast hours (1-360)
    #[serde(default = "default_hourly_steps")]
    pub hourly_steps: u32,

    /// Request weather alerts
    #[serde(default = "default_true")]
    pub alert: bool,

    /// Fetch the separate life index feed
    #[serde(default)]
    pub life_index: bool,

    /// Shift of the forecast window in days
    #[serde(default)]
    pub start_offset_days: i64,

    /// Minutes between scheduled refreshes (at least 1)
    #[serde(default = "default_poll_interval_minutes")]
    pub poll_interval_minutes: u64,

    /// `metric` or `imperial`
    #[serde(default)]
    pub unit_system: UnitSystem,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Label language (`zh` or `en`)
    #[serde(default)]
    pub language: Language,

    /// Snapshot identifier, derived from the coordinates when unset
    #[serde(default)]
    pub location_key: Option<String>,
}

fn serialize_redacted<S: Serializer>(_: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str("[REDACTED]")
}

fn default_api_version() -> String {
    "v2.6".to_string()
}

fn default_base_url() -> String {
    "https://api.caiyunapp.com".to_string()
}

const fn default_daily_steps() -> u32 {
    5
}

const fn default_hourly_steps() -> u32 {
    24
}

const fn default_poll_interval_minutes() -> u64 {
    10
}

const fn default_timeout() -> u64 {
    10
}

impl CaiyunAppConfig {
    /// Minimal configuration with defaults for everything but token and coordinates
    #[must_use]
    pub fn new(api_key: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            latitude,
            longitude,
            api_version: default_api_version(),
            base_url: default_base_url(),
            daily_steps: default_daily_steps(),
            hourly_steps: default_hourly_steps(),
            alert: true,
            life_index: false,
            start_offset_days: 0,
            poll_interval_minutes: default_poll_interval_minutes(),
            unit_system: UnitSystem::default(),
            timeout_secs: default_timeout(),
            language: Language::default(),
            location_key: None,
        }
    }

    /// Convert to the domain `GeoLocation` value object
    ///
    /// Returns `None` if coordinates are invalid.
    #[must_use]
    pub fn to_geo_location(&self) -> Option<GeoLocation> {
        GeoLocation::new(self.latitude, self.longitude).ok()
    }

    /// Collect validation problems, empty when the section is usable
    #[must_use]
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.api_key.expose_secret().trim().is_empty() {
            problems.push("caiyun.api_key must not be empty".to_string());
        }
        if self.to_geo_location().is_none() {
            problems.push(format!(
                "caiyun coordinates out of range: latitude {}, longitude {}",
                self.latitude, self.longitude
            ));
        }
        if !DAILY_STEPS_RANGE.contains(&self.daily_steps) {
            problems.push(format!(
                "caiyun.daily_steps must be within 1-15, got {}",
                self.daily_steps
            ));
        }
        if !HOURLY_STEPS_RANGE.contains(&self.hourly_steps) {
            problems.push(format!(
                "caiyun.hourly_steps must be within 1-360, got {}",
                self.hourly_steps
            ));
        }
        if !START_OFFSET_DAYS_RANGE.contains(&self.start_offset_days) {
            problems.push(format!(
                "caiyun.start_offset_days must be within 0-15, got {}",
                self.start_offset_days
            ));
        }
        if !POLL_INTERVAL_MINUTES_RANGE.contains(&self.poll_interval_minutes) {
            problems.push(format!(
                "caiyun.poll_interval_minutes must be within 1-1440, got {}",
                self.poll_interval_minutes
            ));
        }
        if self.timeout_secs == 0 {
            problems.push("caiyun.timeout_secs must be at least 1".to_string());
        }
        problems
    }

    /// Interval between scheduled refreshes
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_minutes.saturating_mul(60))
    }

    /// HTTP client settings for this section
    #[must_use]
    pub fn to_client_config(&self) -> CaiyunConfig {
        let mut config = CaiyunConfig::new(self.api_key.expose_secret());
        config.base_url = self.base_url.trim_end_matches('/').to_string();
        config.api_version.clone_from(&self.api_version);
        config.timeout_secs = self.timeout_secs;
        config
    }

    /// Coordinator settings for this section
    ///
    /// Returns `None` if coordinates are invalid.
    #[must_use]
    pub fn to_coordinator_config(&self) -> Option<CoordinatorConfig> {
        let location = self.to_geo_location()?;
        let mut config = CoordinatorConfig::new(location);
        if let Some(key) = self.location_key.as_ref().filter(|key| !key.is_empty()) {
            config.location_key.clone_from(key);
        }
        config.daily_steps = self.daily_steps;
        config.hourly_steps = self.hourly_steps;
        config.alert = self.alert;
        config.life_index = self.life_index;
        config.start_offset_days = self.start_offset_days;
        config.unit_system = self.unit_system;
        config.request_timeout = Duration::from_secs(self.timeout_secs);
        Some(config)
    }
}
