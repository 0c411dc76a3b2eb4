//! Logging infrastructure

mod subscriber;

pub use subscriber::{TelemetryConfig, TelemetryError, init_tracing};
