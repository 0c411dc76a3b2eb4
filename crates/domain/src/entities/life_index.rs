//! Life index entities
//!
//! The life index is a slow-moving advisory feed ("good day for washing the
//! car") keyed by category. The provider ships each category as a list of
//! per-day slots; a snapshot keeps one selected entry per category.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One per-day slot of a life index category as sent by the provider
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LifeIndexSlot {
    pub date: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub detail: String,
    /// Any other provider fields (`index`, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Selected life index entry for one category
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LifeIndexEntry {
    /// Date of the slot the entry was taken from
    pub datetime: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub detail: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Raw life index: category name to per-day slots
pub type RawLifeIndex = BTreeMap<String, Vec<LifeIndexSlot>>;

/// Selected life index: category name to entry
pub type LifeIndexMap = BTreeMap<String, LifeIndexEntry>;

impl From<LifeIndexSlot> for LifeIndexEntry {
    fn from(slot: LifeIndexSlot) -> Self {
        Self {
            datetime: slot.date,
            description: slot.desc,
            detail: slot.detail,
            extra: slot.extra,
        }
    }
}
