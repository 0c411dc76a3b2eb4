//! Snapshot entity
//!
//! One immutable, fully merged result of a refresh cycle.

use serde::{Deserialize, Serialize};

use super::{LifeIndexMap, WeatherPayload};
use crate::value_objects::UnitSystem;

/// Primary payload merged with the life index and location metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(flatten)]
    pub weather: WeatherPayload,
    pub lifeindex: LifeIndexMap,
    pub location_key: String,
    pub unit_system: UnitSystem,
}

impl Snapshot {
    /// Merge a primary payload with the life index selected for this cycle
    #[must_use]
    pub fn merge(
        weather: WeatherPayload,
        lifeindex: LifeIndexMap,
        location_key: impl Into<String>,
        unit_system: UnitSystem,
    ) -> Self {
        Self {
            weather,
            lifeindex,
            location_key: location_key.into(),
            unit_system,
        }
    }

    #[must_use]
    pub const fn is_metric(&self) -> bool {
        matches!(self.unit_system, UnitSystem::Metric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        AirQuality, HourlySeries, LifeIndexEntry, Minutely, RawLifeIndex, Realtime, Wind,
    };
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn payload() -> WeatherPayload {
        WeatherPayload {
            server_time: Utc.with_ymd_and_hms(2024, 5, 1, 2, 0, 0).unwrap(),
            api_version: "v2.6".into(),
            timezone: "Asia/Shanghai".into(),
            tzshift: 28800,
            forecast_keypoint: "今天白天晴".into(),
            realtime: Realtime {
                temperature: 21.5,
                apparent_temperature: 20.0,
                humidity: 0.42,
                cloudrate: 0.0,
                skycon: "CLEAR_DAY".into(),
                visibility: 16.0,
                pressure: 101_200.0,
                wind: Wind {
                    speed: 8.0,
                    direction: 90.0,
                },
                precipitation_intensity: 0.0,
                air_quality: AirQuality::default(),
            },
            minutely: Minutely::default(),
            hourly: HourlySeries::default(),
            daily: Vec::new(),
            alerts: Vec::new(),
            regions: Vec::new(),
            daily_life_index: RawLifeIndex::new(),
        }
    }

    #[test]
    fn merge_keeps_life_index_field_for_field() {
        let mut cached = BTreeMap::new();
        cached.insert(
            "CarWashingIndex".to_string(),
            LifeIndexEntry {
                datetime: "2024-05-01".into(),
                description: "适宜".into(),
                detail: "明天无雨".into(),
                extra: BTreeMap::new(),
            },
        );

        let snapshot = Snapshot::merge(payload(), cached.clone(), "121.47-31.23", UnitSystem::Metric);

        assert_eq!(snapshot.lifeindex, cached);
        assert_eq!(snapshot.location_key, "121.47-31.23");
        assert!(snapshot.is_metric());
    }

    #[test]
    fn serialized_snapshot_is_flat() {
        let snapshot =
            Snapshot::merge(payload(), LifeIndexMap::new(), "k", UnitSystem::Imperial);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["forecast_keypoint"], "今天白天晴");
        assert_eq!(json["unit_system"], "imperial");
        assert!(json["lifeindex"].as_object().unwrap().is_empty());
    }
}
