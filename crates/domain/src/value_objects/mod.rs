//! Value Objects - Immutable, identity-less domain primitives

mod condition_code;
mod geo_location;
mod language;
mod unit_system;
mod wind;

pub use condition_code::{ConditionCode, ConditionInfo, IconKey};
pub use geo_location::GeoLocation;
pub use language::Language;
pub use unit_system::{NativeUnits, UnitSystem};
pub use wind::{WIND_SCALE_THRESHOLDS_KMH, WindDirection, WindScale};
