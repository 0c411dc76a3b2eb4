//! Domain entities - Objects with identity and lifecycle

mod life_index;
mod snapshot;
mod weather;

pub use life_index::{LifeIndexEntry, LifeIndexMap, LifeIndexSlot, RawLifeIndex};
pub use snapshot::Snapshot;
pub use weather::{
    AdminRegion, Alert, AirQuality, AqiDescription, AqiPair, DailyRecord, DayPart, HourlyRecord,
    HourlySeries, Minutely, Realtime, ValueRange, WeatherPayload, Wind, WindRange, aligned_len,
};
