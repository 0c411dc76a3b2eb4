//! Factory functions for scheduled tasks
//!
//! Provides pre-built task closures for the scheduler to run:
//! - Weather refresh (every `poll_interval_minutes`)

use std::sync::Arc;

use application::RefreshCoordinator;
use futures::future::BoxFuture;
use tracing::{debug, error, info};

/// Task name for the weather refresh
pub const WEATHER_REFRESH_TASK: &str = "weather_refresh";

/// Create a weather refresh task closure
///
/// Each run performs one refresh cycle. A failed cycle keeps the previous
/// snapshot and is reported to the scheduler as a task failure.
pub fn create_weather_refresh_task(
    coordinator: Arc<RefreshCoordinator>,
) -> impl Fn() -> BoxFuture<'static, Result<(), String>> + Send + Sync + 'static {
    move || {
        let coordinator = Arc::clone(&coordinator);

        Box::pin(async move {
            debug!("Refreshing weather snapshot");

            match coordinator.refresh().await {
                Ok(snapshot) => {
                    info!(
                        server_time = %snapshot.weather.server_time,
                        location = %snapshot.location_key,
                        "Weather snapshot refreshed"
                    );
                    Ok(())
                },
                Err(e) => {
                    if e.is_contract_violation() {
                        error!(error = %e, "Weather payload violates the provider contract");
                    } else {
                        error!(error = %e, retryable = e.is_retryable(), "Weather refresh failed");
                    }
                    Err(format!("Weather refresh failed: {e}"))
                },
            }
        })
    }
}
