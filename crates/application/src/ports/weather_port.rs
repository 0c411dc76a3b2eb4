//! Weather provider port
//!
//! Defines the interface for fetching forecast and life index data.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::entities::{RawLifeIndex, WeatherPayload};
use domain::value_objects::{GeoLocation, UnitSystem};
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::ApplicationError;

/// Parameters of one primary forecast request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    /// Forecast location
    pub location: GeoLocation,
    /// Number of forecast days
    pub daily_steps: u32,
    /// Number of forecast hours
    pub hourly_steps: u32,
    /// Include active alerts and administrative regions
    pub alert: bool,
    /// Unit system of the returned values
    pub unit_system: UnitSystem,
    /// Anchor of the forecast window
    pub timestamp: DateTime<Utc>,
}

/// Port for weather provider operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WeatherProviderPort: Send + Sync {
    /// Fetch the primary forecast payload
    async fn fetch_forecast(
        &self,
        request: &ForecastRequest,
    ) -> Result<WeatherPayload, ApplicationError>;

    /// Fetch the raw life index feed
    ///
    /// Returns `Ok(None)` when the feed answered without a result block, in
    /// which case callers fall back to the life index in the primary payload.
    async fn fetch_life_index(
        &self,
        location: &GeoLocation,
    ) -> Result<Option<RawLifeIndex>, ApplicationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_object_safe(_: &dyn WeatherProviderPort) {}

    #[test]
    fn trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn WeatherProviderPort>();
    }

    #[test]
    fn forecast_request_serializes_unit_system() {
        let request = ForecastRequest {
            location: GeoLocation::new(31.23, 121.47).expect("valid"),
            daily_steps: 5,
            hourly_steps: 24,
            alert: true,
            unit_system: UnitSystem::Metric,
            timestamp: DateTime::from_timestamp(1_714_528_800, 0).expect("valid timestamp"),
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json["unit_system"], "metric");
        assert_eq!(json["hourly_steps"], 24);
    }
}
