//! Life index slot selection and suggestion views

use domain::DomainError;
use domain::entities::{LifeIndexEntry, LifeIndexMap, RawLifeIndex, Snapshot};
use serde::Serialize;

/// From this local hour on, tomorrow's slot is reported
pub const EVENING_HOUR: u32 = 18;

/// Provider bookkeeping key that is not a category
const META_KEY: &str = "meta";

const TODAY: &str = "今日";
const TOMORROW: &str = "明日";

/// Pick one slot per category for the given local hour
///
/// Before [`EVENING_HOUR`] the first (today) slot is used unchanged. From the
/// evening on the second (tomorrow) slot is used and "今日" in its texts is
/// rewritten to "明日".
pub fn select_life_index(raw: &RawLifeIndex, local_hour: u32) -> Result<LifeIndexMap, DomainError> {
    let evening = local_hour >= EVENING_HOUR;
    let slot_index = usize::from(evening);

    raw.iter()
        .filter(|(category, _)| category.as_str() != META_KEY)
        .map(|(category, slots)| {
            let slot = slots.get(slot_index).cloned().ok_or_else(|| {
                DomainError::malformed(format!(
                    "life index category {category} has {} slot(s), slot {slot_index} required",
                    slots.len()
                ))
            })?;
            let mut entry = LifeIndexEntry::from(slot);
            if evening {
                entry.description = entry.description.replace(TODAY, TOMORROW);
                entry.detail = entry.detail.replace(TODAY, TOMORROW);
            }
            Ok((category.clone(), entry))
        })
        .collect()
}

/// Display name of a life index category
#[must_use]
pub fn category_title(category: &str) -> &str {
    match category {
        "AnglingIndex" => "钓鱼指数",
        "AirConditionerIndex" => "空调开机指数",
        "AllergyIndex" => "过敏指数",
        "HeatstrokeIndex" => "中暑指数",
        "RainGearIndex" => "雨具指数",
        "DryingIndex" => "晾晒指数",
        "WindColdIndex" => "风寒指数",
        "KiteIndex" => "风筝指数",
        "MorningExerciseIndex" => "晨练指数",
        "UltravioletIndex" => "紫外线指数",
        "DrinkingIndex" => "饮酒指数",
        "ComfortIndex" => "舒适指数",
        "CarWashingIndex" | "carWashing" => "洗车指数",
        "DressingIndex" | "dressing" => "穿衣指数",
        "ColdRiskIndex" | "coldRisk" => "感冒指数",
        "AQIIndex" => "空气污染指数",
        "WashClothesIndex" => "洗衣指数",
        "MakeUpIndex" => "化妆指数",
        "MoodIndex" => "情绪指数",
        "SportIndex" => "运动指数",
        "TravelIndex" => "旅游指数",
        "DatingIndex" => "交友指数",
        "ShoppingIndex" => "逛街指数",
        "HairdressingIndex" => "美发指数",
        "NightLifeIndex" => "夜生活",
        "BoatingIndex" => "划船指数",
        "RoadConditionIndex" => "路况指数",
        "TrafficIndex" => "交通指数",
        "ultraviolet" => "紫外线",
        "comfort" => "舒适度指数",
        other => other,
    }
}

/// One life index suggestion as shown on a weather card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub title: String,
    pub title_cn: String,
    /// Brief rating
    pub brf: String,
    /// Full advice text
    pub txt: String,
}

/// Suggestions for every category in the snapshot's life index
#[must_use]
pub fn life_index_suggestions(snapshot: &Snapshot) -> Vec<Suggestion> {
    snapshot
        .lifeindex
        .iter()
        .map(|(category, entry)| Suggestion {
            title: category.clone(),
            title_cn: category_title(category).to_string(),
            brf: entry.description.clone(),
            txt: entry.detail.clone(),
        })
        .collect()
}
