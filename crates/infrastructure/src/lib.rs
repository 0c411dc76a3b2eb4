//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer.
//! Contains the CaiYun weather adapter, configuration, logging and scheduling.

pub mod adapters;
pub mod config;
pub mod scheduled_tasks;
pub mod scheduler;
pub mod telemetry;

pub use adapters::*;
pub use config::{AppConfig, CaiyunAppConfig};
pub use scheduled_tasks::{WEATHER_REFRESH_TASK, create_weather_refresh_task};
pub use scheduler::{JobStats, RunReport, SchedulerConfig, SchedulerError, TaskScheduler};
pub use telemetry::{TelemetryConfig, TelemetryError, init_tracing};
