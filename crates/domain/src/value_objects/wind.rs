//! Wind direction and wind scale buckets

use std::fmt;

use serde::{Serialize, Serializer};

use super::Language;

const COMPASS_ZH: [&str; 17] = [
    "北", "北-东北", "东北", "东-东北", "东", "东-东南", "东南", "南-东南", "南", "南-西南", "西南",
    "西-西南", "西", "西-西北", "西北", "北-西北", "北",
];

const COMPASS_EN: [&str; 17] = [
    "N", "N-NE", "NE", "E-NE", "E", "E-SE", "SE", "S-SE", "S", "S-SW", "SW", "W-SW", "W", "W-NW",
    "NW", "N-NW", "N",
];

/// Lower bounds (km/h) of scale levels 1 through 17
pub const WIND_SCALE_THRESHOLDS_KMH: [f64; 17] = [
    1.0, 6.0, 12.0, 20.0, 29.0, 39.0, 50.0, 62.0, 75.0, 88.0, 103.0, 118.0, 134.0, 150.0, 167.0,
    184.0, 202.0,
];

/// (zh label, zh description, en label, en description) per level
const SCALE_TEXT: [(&str, &str, &str, &str); 18] = [
    ("无风", "静，烟直上", "calm", "smoke rises vertically"),
    ("软风", "烟示风向", "light air", "smoke drift shows direction"),
    ("轻风", "感觉有风", "light breeze", "wind felt on face"),
    ("微风", "旌旗展开", "gentle breeze", "flags extended"),
    ("和风", "吹起尘土", "moderate breeze", "raises dust"),
    ("清风", "小树摇摆", "fresh breeze", "small trees sway"),
    ("强风", "电线有声", "strong breeze", "wires whistle"),
    ("劲风（疾风）", "步行困难", "near gale", "walking is difficult"),
    ("狂风大作", "狂风大作", "gale", "gale"),
    ("狂风呼啸", "狂风呼啸", "strong gale", "strong gale"),
    ("暴风毁树", "暴风毁树", "storm", "trees uprooted"),
    ("暴风毁树", "暴风毁树", "violent storm", "trees uprooted"),
    ("飓风", "飓风", "hurricane", "hurricane"),
    ("台风", "台风", "typhoon", "typhoon"),
    ("强台风", "强台风", "severe typhoon", "severe typhoon"),
    ("强台风", "强台风", "severe typhoon", "severe typhoon"),
    ("超强台风", "超强台风", "super typhoon", "super typhoon"),
    ("超强台风", "超强台风", "super typhoon", "super typhoon"),
];

/// One of 17 compass points (index 16 closes the wrap back to north)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindDirection(u8);

impl WindDirection {
    /// Bucket a bearing in degrees into 22.5°-wide sectors centred on the compass points
    #[must_use]
    pub fn from_degrees(degrees: f64) -> Self {
        let normalized = degrees.rem_euclid(360.0);
        let bucket = ((normalized + 11.25) / 22.5).floor() as usize % COMPASS_ZH.len();
        Self(bucket as u8)
    }

    /// Compass table index (0..=16)
    #[must_use]
    pub const fn index(&self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn label(&self, language: Language) -> &'static str {
        let i = self.0 as usize;
        match language {
            Language::Zh => COMPASS_ZH[i],
            Language::En => COMPASS_EN[i],
        }
    }
}

/// Wind scale level 0..=17 (17 is open ended)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindScale(u8);

impl WindScale {
    /// Highest level, reported as `17+`
    pub const MAX_LEVEL: u8 = 17;

    /// Bucket a speed in km/h; values exactly on a threshold belong to the higher level
    #[must_use]
    pub fn from_speed_kmh(speed: f64) -> Self {
        let level = WIND_SCALE_THRESHOLDS_KMH
            .iter()
            .take_while(|threshold| speed >= **threshold)
            .count();
        Self(level as u8)
    }

    #[must_use]
    pub const fn level(&self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn label(&self, language: Language) -> &'static str {
        let text = SCALE_TEXT[self.0 as usize];
        match language {
            Language::Zh => text.0,
            Language::En => text.2,
        }
    }

    #[must_use]
    pub const fn description(&self, language: Language) -> &'static str {
        let text = SCALE_TEXT[self.0 as usize];
        match language {
            Language::Zh => text.1,
            Language::En => text.3,
        }
    }
}

impl fmt::Display for WindScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 >= Self::MAX_LEVEL {
            write!(f, "{}+", Self::MAX_LEVEL)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl Serialize for WindScale {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
