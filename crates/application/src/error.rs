//! Application-level errors

use std::fmt;
use std::time::Duration;

use domain::DomainError;
use thiserror::Error;

/// Which outbound request of a refresh cycle failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Primary forecast request
    Forecast,
    /// Secondary life index request
    LifeIndex,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forecast => write!(f, "forecast"),
            Self::LifeIndex => write!(f, "life index"),
        }
    }
}

/// Errors that can occur in the application layer
///
/// A failed refresh cycle reports one of these; the previous snapshot stays current.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Provider could not be reached
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request exceeded its time bound
    #[error("{request} request timed out after {after:?}")]
    Timeout { request: RequestKind, after: Duration },

    /// Provider JSON could not be decoded or lacks expected keys
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// External service error
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Check if this error is transient
    ///
    /// The coordinator never retries on its own; this only informs the caller's polling.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_) | Self::Timeout { .. } | Self::ExternalService(_)
        )
    }

    /// Check if this error signals a provider contract change or an incomplete lookup table
    pub const fn is_contract_violation(&self) -> bool {
        match self {
            Self::MalformedPayload(_) => true,
            Self::Domain(err) => err.is_contract_violation(),
            _ => false,
        }
    }
}
