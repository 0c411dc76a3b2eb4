//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod caiyun_adapter;
mod system_clock;

pub use caiyun_adapter::CaiyunWeatherAdapter;
pub use system_clock::SystemClock;
