//! Application layer - Use cases and orchestration
//!
//! Contains the refresh coordinator, the forecast transformer, and the port
//! definitions implemented by infrastructure adapters.

pub mod error;
pub mod ports;
pub mod services;

pub use error::{ApplicationError, RequestKind};
pub use ports::*;
pub use services::*;
