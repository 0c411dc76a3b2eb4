//! Forecast location

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::DomainError;

/// Coordinates a forecast is requested for
///
/// Deserialization goes through [`GeoLocation::new`], so an out of range
/// pair never reaches the API client.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Coordinates")]
pub struct GeoLocation {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<Coordinates> for GeoLocation {
    type Error = DomainError;

    fn try_from(raw: Coordinates) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl GeoLocation {
    /// Validate and wrap a latitude/longitude pair
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ValidationError` when latitude is outside
    /// [-90, 90], longitude is outside [-180, 180], or either is NaN.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, DomainError> {
        let valid =
            (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(DomainError::ValidationError(format!(
                "coordinates out of range: latitude {latitude}, longitude {longitude}"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// `lng,lat` as it appears in CaiYun request paths
    #[must_use]
    pub fn api_path_segment(&self) -> String {
        format!("{},{}", self.longitude, self.latitude)
    }

    /// Default snapshot identifier, `lng-lat`
    #[must_use]
    pub fn location_key(&self) -> String {
        format!("{}-{}", self.longitude, self.latitude)
    }
}

impl fmt::Display for GeoLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = if self.latitude < 0.0 { 'S' } else { 'N' };
        let ew = if self.longitude < 0.0 { 'W' } else { 'E' };
        write!(
            f,
            "{:.4}°{ns} {:.4}°{ew}",
            self.latitude.abs(),
            self.longitude.abs()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_range_bounds() {
        assert!(GeoLocation::new(90.0, 180.0).is_ok());
        assert!(GeoLocation::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn rejects_out_of_range_and_nan() {
        for (lat, lng) in [(90.5, 0.0), (0.0, -180.1), (f64::NAN, 121.47), (31.23, f64::NAN)] {
            let err = GeoLocation::new(lat, lng).unwrap_err();
            assert!(matches!(err, DomainError::ValidationError(_)), "{lat},{lng}");
        }
    }

    #[test]
    fn api_path_puts_longitude_first() {
        let shanghai = GeoLocation::new(31.23, 121.47).unwrap();
        assert_eq!(shanghai.api_path_segment(), "121.47,31.23");
        assert_eq!(shanghai.location_key(), "121.47-31.23");
    }

    #[test]
    fn display_uses_hemispheres() {
        let lima = GeoLocation::new(-12.0464, -77.0428).unwrap();
        assert_eq!(lima.to_string(), "12.0464°S 77.0428°W");
    }

    #[test]
    fn deserialization_validates() {
        let ok: GeoLocation =
            serde_json::from_str(r#"{"latitude": 31.23, "longitude": 121.47}"#).unwrap();
        assert!((ok.latitude() - 31.23).abs() < f64::EPSILON);

        let bad = serde_json::from_str::<GeoLocation>(r#"{"latitude": 95.0, "longitude": 0.0}"#);
        assert!(bad.is_err());
    }
}
