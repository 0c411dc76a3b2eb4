//! Application configuration
//!
//! Split into focused sub-modules:
//! - `caiyun`: weather source, location and polling settings
//!
//! Sources are layered: built-in defaults, then `config.toml` (or an explicit
//! file), then `COLORFULCLOUDS_*` environment variables with `__` between
//! nested keys (e.g. `COLORFULCLOUDS_CAIYUN__API_KEY`).

mod caiyun;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::telemetry::TelemetryConfig;

pub use caiyun::{
    CaiyunAppConfig, DAILY_STEPS_RANGE, HOURLY_STEPS_RANGE, POLL_INTERVAL_MINUTES_RANGE,
    START_OFFSET_DAYS_RANGE,
};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "COLORFULCLOUDS";

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Weather source configuration
    pub caiyun: CaiyunAppConfig,

    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from environment and optional `config.toml`
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read or required keys are missing.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::build(config::File::with_name("config").required(false))
    }

    /// Load configuration from the given file, overridden by environment
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or required keys are missing.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, config::ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading configuration file");
        Self::build(config::File::from(path).required(true))
    }

    fn build<S>(file: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let builder = config::Config::builder()
            // Start with defaults
            .set_default("caiyun.api_version", "v2.6")?
            .set_default("caiyun.base_url", "https://api.caiyunapp.com")?
            .add_source(file)
            // Override with environment variables (e.g., COLORFULCLOUDS_CAIYUN__LATITUDE)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Check value ranges and coordinates
    ///
    /// # Errors
    ///
    /// Returns a message listing every problem found.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let problems = self.caiyun.problems();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(config::ConfigError::Message(problems.join("; ")))
        }
    }
}
