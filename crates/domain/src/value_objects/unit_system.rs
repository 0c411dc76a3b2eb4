//! Unit system selection

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

const KMH_PER_MPH: f64 = 1.609_344;

/// Unit system requested from the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    /// SI units (`metric:v2`)
    #[default]
    Metric,
    /// Imperial units
    Imperial,
}

/// Native units of the values in a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NativeUnits {
    pub precipitation: &'static str,
    pub pressure: &'static str,
    pub temperature: &'static str,
    pub visibility: &'static str,
    pub wind_speed: &'static str,
}

impl UnitSystem {
    /// Value of the `unit` query parameter
    #[must_use]
    pub const fn api_tag(&self) -> &'static str {
        match self {
            Self::Metric => "metric:v2",
            Self::Imperial => "imperial",
        }
    }

    /// Parse the `unit` tag echoed back by the API
    ///
    /// Any `metric*` flavour is treated as metric.
    pub fn from_api_tag(tag: &str) -> Result<Self, DomainError> {
        if tag.starts_with("metric") {
            Ok(Self::Metric)
        } else if tag == "imperial" {
            Ok(Self::Imperial)
        } else {
            Err(DomainError::ValidationError(format!("Unknown unit tag: {tag}")))
        }
    }

    #[must_use]
    pub const fn native_units(&self) -> NativeUnits {
        match self {
            Self::Metric => NativeUnits {
                precipitation: "mm",
                pressure: "hPa",
                temperature: "°C",
                visibility: "km",
                wind_speed: "km/h",
            },
            Self::Imperial => NativeUnits {
                precipitation: "in",
                pressure: "inHg",
                temperature: "°F",
                visibility: "mi",
                wind_speed: "mph",
            },
        }
    }

    /// Convert a native wind speed to km/h
    #[must_use]
    pub fn wind_speed_kmh(&self, speed: f64) -> f64 {
        match self {
            Self::Metric => speed,
            Self::Imperial => speed * KMH_PER_MPH,
        }
    }

    /// Convert a raw API pressure reading to the native pressure unit
    ///
    /// Metric readings arrive in Pa and are reported as whole hPa.
    #[must_use]
    pub fn native_pressure(&self, raw: f64) -> f64 {
        match self {
            Self::Metric => (raw / 100.0).round(),
            Self::Imperial => raw,
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metric => write!(f, "metric"),
            Self::Imperial => write!(f, "imperial"),
        }
    }
}

impl FromStr for UnitSystem {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "metric" | "metric:v2" | "si" => Ok(Self::Metric),
            "imperial" | "us" => Ok(Self::Imperial),
            _ => Err(DomainError::ValidationError(format!(
                "Invalid unit system: {s}. Use 'metric' or 'imperial'"
            ))),
        }
    }
}
