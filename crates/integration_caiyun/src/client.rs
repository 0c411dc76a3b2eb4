//! CaiYun weather client
//!
//! HTTP client for the ColorfulClouds (CaiYun) Weather API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::models::{LifeIndexResponse, WeatherResponse};

/// Keys with this prefix belong to the vendor app and need its client headers
const VENDOR_KEY_PREFIX: &str = "UR8ASa";

const VENDOR_USER_AGENT: &str = "ColorfulCloudsPro/6.7.2 (iPhone; iOS 16.2; Scale/3.00)";
const VENDOR_DEVICE_ID: &str = "D9AB80E9-B5CE-40FD-96CD-8E38CF5287B7";
const VENDOR_APP_VERSION: &str = "6.7.2";
const VENDOR_APP_NAME: &str = "weather";

/// CaiYun client errors
#[derive(Debug, Error)]
pub enum CaiyunError {
    /// Connection to the weather service failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request did not complete in time
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Request to the weather service failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Service is temporarily unavailable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Failed to parse response from weather service
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The API answered with a non-`ok` status
    #[error("API status {status}: {message}")]
    ApiStatus { status: String, message: String },

    /// Invalid coordinates provided
    #[error("Invalid coordinates: latitude must be -90 to 90, longitude must be -180 to 180")]
    InvalidCoordinates,
}

/// CaiYun service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CaiyunConfig {
    /// API token
    pub api_key: SecretString,

    /// API base URL (default: <https://api.caiyunapp.com>)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Forecast API version (default: v2.6)
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Request timeout in seconds (default: 10)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.caiyunapp.com".to_string()
}

fn default_api_version() -> String {
    "v2.6".to_string()
}

const fn default_timeout() -> u64 {
    10
}

impl CaiyunConfig {
    /// Configuration with defaults for everything but the token
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: default_base_url(),
            api_version: default_api_version(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Parameters of a `weather.json` request
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub daily_steps: u32,
    pub hourly_steps: u32,
    pub alert: bool,
    /// Unit tag (`metric:v2` or `imperial`)
    pub unit: String,
    /// Unix timestamp anchoring the forecast window
    pub timestamp: i64,
}

/// CaiYun client trait
#[async_trait]
pub trait CaiyunApi: Send + Sync {
    /// Fetch realtime conditions, forecasts and alerts
    async fn get_weather(&self, query: &WeatherQuery) -> Result<WeatherResponse, CaiyunError>;

    /// Fetch the life index feed
    async fn get_life_index(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<LifeIndexResponse, CaiyunError>;
}

/// CaiYun HTTP client implementation
#[derive(Debug)]
pub struct CaiyunClient {
    client: Client,
    config: CaiyunConfig,
}

impl CaiyunClient {
    /// Create a new client with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: CaiyunConfig) -> Result<Self, CaiyunError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CaiyunError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Validate coordinates
    fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), CaiyunError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(CaiyunError::InvalidCoordinates);
        }
        Ok(())
    }

    /// Whether requests must carry the vendor app headers
    fn uses_vendor_headers(&self) -> bool {
        self.config.api_key.expose_secret().starts_with(VENDOR_KEY_PREFIX)
    }

    /// Headers the vendor app sends with its requests
    fn vendor_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(VENDOR_USER_AGENT));
        headers.insert(
            HeaderName::from_static("device-id"),
            HeaderValue::from_static(VENDOR_DEVICE_ID),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("zh-Hans-CN;q=1"));
        headers.insert(
            HeaderName::from_static("app-version"),
            HeaderValue::from_static(VENDOR_APP_VERSION),
        );
        headers.insert(
            HeaderName::from_static("app_name"),
            HeaderValue::from_static(VENDOR_APP_NAME),
        );
        headers.insert(
            HeaderName::from_static("app-name"),
            HeaderValue::from_static(VENDOR_APP_NAME),
        );
        headers
    }

    /// Path of the forecast endpoint with the token in place of `key`
    fn weather_path(&self, key: &str, latitude: f64, longitude: f64) -> String {
        format!(
            "{}/{}/{}/{},{}/weather.json",
            self.config.base_url, self.config.api_version, key, longitude, latitude
        )
    }

    fn life_index_url(&self) -> String {
        format!("{}/v1/lifeindex/", self.config.base_url)
    }

    fn with_vendor_headers(&self, builder: RequestBuilder) -> RequestBuilder {
        if self.uses_vendor_headers() {
            builder.headers(Self::vendor_headers())
        } else {
            builder
        }
    }

    fn map_send_error(e: &reqwest::Error) -> CaiyunError {
        if e.is_timeout() {
            CaiyunError::Timeout(e.to_string())
        } else if e.is_connect() {
            CaiyunError::ConnectionFailed(e.to_string())
        } else {
            CaiyunError::RequestFailed(e.to_string())
        }
    }

    /// A body cut short by the peer is a transport failure, not a bad payload
    fn map_body_error(e: &reqwest::Error) -> CaiyunError {
        if e.is_timeout() {
            CaiyunError::Timeout(e.to_string())
        } else if e.is_body() || e.is_connect() {
            CaiyunError::ConnectionFailed(e.to_string())
        } else {
            CaiyunError::RequestFailed(e.to_string())
        }
    }

    /// Send a request and decode the JSON body
    async fn fetch_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, CaiyunError> {
        let response = self
            .with_vendor_headers(builder)
            .send()
            .await
            .map_err(|e| Self::map_send_error(&e))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CaiyunError::RateLimitExceeded);
        }
        if status.is_server_error() {
            return Err(CaiyunError::ServiceUnavailable(format!("HTTP {status}")));
        }
        if !status.is_success() {
            return Err(CaiyunError::RequestFailed(format!("HTTP {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Self::map_body_error(&e))?;
        serde_json::from_slice(&body).map_err(|e| CaiyunError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl CaiyunApi for CaiyunClient {
    #[instrument(skip(self), fields(lat = %query.latitude, lon = %query.longitude))]
    async fn get_weather(&self, query: &WeatherQuery) -> Result<WeatherResponse, CaiyunError> {
        Self::validate_coordinates(query.latitude, query.longitude)?;

        let url = self.weather_path(
            self.config.api_key.expose_secret(),
            query.latitude,
            query.longitude,
        );
        debug!(
            url = %self.weather_path("***", query.latitude, query.longitude),
            daily_steps = query.daily_steps,
            hourly_steps = query.hourly_steps,
            unit = %query.unit,
            timestamp = query.timestamp,
            "Fetching weather"
        );

        let builder = self.client.get(&url).query(&[
            ("dailysteps", query.daily_steps.to_string()),
            ("hourlysteps", query.hourly_steps.to_string()),
            ("alert", query.alert.to_string()),
            ("unit", query.unit.clone()),
            ("timestamp", query.timestamp.to_string()),
        ]);

        let response: WeatherResponse = self.fetch_json(builder).await?;
        if response.status != "ok" {
            let message = response.error.clone().unwrap_or_default();
            warn!(status = %response.status, message = %message, "Weather API reported failure");
            return Err(CaiyunError::ApiStatus {
                status: response.status,
                message,
            });
        }
        if response.result.is_none() {
            return Err(CaiyunError::ParseError(
                "No result block in weather response".to_string(),
            ));
        }

        Ok(response)
    }

    #[instrument(skip(self), fields(lat = %latitude, lon = %longitude))]
    async fn get_life_index(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<LifeIndexResponse, CaiyunError> {
        Self::validate_coordinates(latitude, longitude)?;

        let url = self.life_index_url();
        debug!(url = %url, "Fetching life index");

        let builder = self.client.get(&url).query(&[
            ("token", self.config.api_key.expose_secret().to_string()),
            ("lng", longitude.to_string()),
            ("lat", latitude.to_string()),
        ]);

        self.fetch_json(builder).await
    }
}
