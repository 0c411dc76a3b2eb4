//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// Sky condition code missing from the lookup table
    #[error("Unknown condition code: {0}")]
    UnknownConditionCode(String),

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// Date/time parsing error
    #[error("Invalid date/time: {0}")]
    InvalidDateTime(String),

    /// Provider payload is missing expected keys or has misaligned series
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

impl DomainError {
    /// Create a malformed payload error
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedPayload(detail.into())
    }

    /// Whether this error indicates a provider contract change rather than bad input
    #[must_use]
    pub const fn is_contract_violation(&self) -> bool {
        matches!(self, Self::UnknownConditionCode(_) | Self::MalformedPayload(_))
    }
}
