//! Application services - Use case implementations

pub mod forecast_transformer;
mod life_index;
mod refresh_coordinator;

pub use forecast_transformer::{
    CurrentConditions, DayForecast, HourForecast, HourlyForecast, WindScaleView, WindView,
};
pub use life_index::{EVENING_HOUR, Suggestion, category_title, life_index_suggestions, select_life_index};
pub use refresh_coordinator::{
    CoordinatorConfig, DEFAULT_LIFE_INDEX_TTL_SECS, DEFAULT_REQUEST_TIMEOUT_SECS, LifeIndexCache,
    RefreshCoordinator, SnapshotListener,
};
