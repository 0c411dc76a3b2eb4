//! Clock port
//!
//! Wall-clock access behind a trait so refresh cadence and day-part
//! selection can be driven deterministically in tests.

use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;

/// Port for reading the current time
#[cfg_attr(test, automock)]
pub trait ClockPort: Send + Sync {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;
}
