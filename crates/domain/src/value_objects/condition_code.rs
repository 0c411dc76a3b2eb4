//! Sky condition codes reported by the CaiYun API
//!
//! Each raw `skycon` string maps to exactly one [`ConditionInfo`] holding the
//! icon key used by weather cards and the localized labels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Language;
use crate::errors::DomainError;

/// Icon condition keys understood by weather cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IconKey {
    #[serde(rename = "sunny")]
    Sunny,
    #[serde(rename = "clear-night")]
    ClearNight,
    #[serde(rename = "partlycloudy")]
    PartlyCloudy,
    #[serde(rename = "cloudy")]
    Cloudy,
    #[serde(rename = "fog")]
    Fog,
    #[serde(rename = "rainy")]
    Rainy,
    #[serde(rename = "pouring")]
    Pouring,
    #[serde(rename = "snowy")]
    Snowy,
    #[serde(rename = "lightning-rainy")]
    LightningRainy,
    #[serde(rename = "hail")]
    Hail,
    #[serde(rename = "snowy-rainy")]
    SnowyRainy,
    #[serde(rename = "windy")]
    Windy,
}

impl IconKey {
    /// Wire name of the icon key
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sunny => "sunny",
            Self::ClearNight => "clear-night",
            Self::PartlyCloudy => "partlycloudy",
            Self::Cloudy => "cloudy",
            Self::Fog => "fog",
            Self::Rainy => "rainy",
            Self::Pouring => "pouring",
            Self::Snowy => "snowy",
            Self::LightningRainy => "lightning-rainy",
            Self::Hail => "hail",
            Self::SnowyRainy => "snowy-rainy",
            Self::Windy => "windy",
        }
    }
}

impl fmt::Display for IconKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup row for a condition code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionInfo {
    /// Icon key
    pub icon: IconKey,
    /// Simplified Chinese label
    pub zh: &'static str,
    /// English label
    pub en: &'static str,
}

/// Raw sky condition code (`skycon`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionCode {
    ClearDay,
    ClearNight,
    PartlyCloudyDay,
    PartlyCloudyNight,
    Cloudy,
    LightHaze,
    ModerateHaze,
    HeavyHaze,
    LightRain,
    ModerateRain,
    HeavyRain,
    StormRain,
    Fog,
    LightSnow,
    ModerateSnow,
    HeavySnow,
    StormSnow,
    Dust,
    Sand,
    ThunderShower,
    Hail,
    Sleet,
    Wind,
    Haze,
    Rain,
    Snow,
}

impl ConditionCode {
    /// Every documented code, in API documentation order
    pub const ALL: [Self; 26] = [
        Self::ClearDay,
        Self::ClearNight,
        Self::PartlyCloudyDay,
        Self::PartlyCloudyNight,
        Self::Cloudy,
        Self::LightHaze,
        Self::ModerateHaze,
        Self::HeavyHaze,
        Self::LightRain,
        Self::ModerateRain,
        Self::HeavyRain,
        Self::StormRain,
        Self::Fog,
        Self::LightSnow,
        Self::ModerateSnow,
        Self::HeavySnow,
        Self::StormSnow,
        Self::Dust,
        Self::Sand,
        Self::ThunderShower,
        Self::Hail,
        Self::Sleet,
        Self::Wind,
        Self::Haze,
        Self::Rain,
        Self::Snow,
    ];

    /// The single lookup table for icon key and labels
    #[must_use]
    pub const fn info(&self) -> ConditionInfo {
        use IconKey as I;
        let (icon, zh, en) = match self {
            Self::ClearDay => (I::Sunny, "晴", "clear"),
            Self::ClearNight => (I::ClearNight, "晴", "clear"),
            Self::PartlyCloudyDay | Self::PartlyCloudyNight => {
                (I::PartlyCloudy, "多云", "partly cloudy")
            },
            Self::Cloudy => (I::Cloudy, "阴", "overcast"),
            Self::LightHaze => (I::Fog, "轻雾", "light haze"),
            Self::ModerateHaze => (I::Fog, "中雾", "moderate haze"),
            Self::HeavyHaze => (I::Fog, "大雾", "heavy haze"),
            Self::LightRain => (I::Rainy, "小雨", "light rain"),
            Self::ModerateRain => (I::Rainy, "中雨", "moderate rain"),
            Self::HeavyRain => (I::Pouring, "大雨", "heavy rain"),
            Self::StormRain => (I::Pouring, "暴雨", "rainstorm"),
            Self::Fog => (I::Fog, "雾", "fog"),
            Self::LightSnow => (I::Snowy, "小雪", "light snow"),
            Self::ModerateSnow => (I::Snowy, "中雪", "moderate snow"),
            Self::HeavySnow => (I::Snowy, "大雪", "heavy snow"),
            Self::StormSnow => (I::Snowy, "暴雪", "snowstorm"),
            Self::Dust => (I::Fog, "浮尘", "dust"),
            Self::Sand => (I::Fog, "沙尘", "sandstorm"),
            Self::ThunderShower => (I::LightningRainy, "雷阵雨", "thunder shower"),
            Self::Hail => (I::Hail, "冰雹", "hail"),
            Self::Sleet => (I::SnowyRainy, "雨夹雪", "sleet"),
            Self::Wind => (I::Windy, "大风", "strong wind"),
            Self::Haze => (I::Fog, "雾霾", "haze"),
            Self::Rain => (I::Rainy, "雨", "rain"),
            Self::Snow => (I::Snowy, "雪", "snow"),
        };
        ConditionInfo { icon, zh, en }
    }

    /// Icon key for weather cards
    #[must_use]
    pub const fn icon(&self) -> IconKey {
        self.info().icon
    }

    /// Label in the requested language
    #[must_use]
    pub const fn label(&self, language: Language) -> &'static str {
        let info = self.info();
        match language {
            Language::Zh => info.zh,
            Language::En => info.en,
        }
    }

    /// Raw API spelling of the code
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ClearDay => "CLEAR_DAY",
            Self::ClearNight => "CLEAR_NIGHT",
            Self::PartlyCloudyDay => "PARTLY_CLOUDY_DAY",
            Self::PartlyCloudyNight => "PARTLY_CLOUDY_NIGHT",
            Self::Cloudy => "CLOUDY",
            Self::LightHaze => "LIGHT_HAZE",
            Self::ModerateHaze => "MODERATE_HAZE",
            Self::HeavyHaze => "HEAVY_HAZE",
            Self::LightRain => "LIGHT_RAIN",
            Self::ModerateRain => "MODERATE_RAIN",
            Self::HeavyRain => "HEAVY_RAIN",
            Self::StormRain => "STORM_RAIN",
            Self::Fog => "FOG",
            Self::LightSnow => "LIGHT_SNOW",
            Self::ModerateSnow => "MODERATE_SNOW",
            Self::HeavySnow => "HEAVY_SNOW",
            Self::StormSnow => "STORM_SNOW",
            Self::Dust => "DUST",
            Self::Sand => "SAND",
            Self::ThunderShower => "THUNDER_SHOWER",
            Self::Hail => "HAIL",
            Self::Sleet => "SLEET",
            Self::Wind => "WIND",
            Self::Haze => "HAZE",
            Self::Rain => "RAIN",
            Self::Snow => "SNOW",
        }
    }
}

impl FromStr for ConditionCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| DomainError::UnknownConditionCode(s.to_string()))
    }
}

impl fmt::Display for ConditionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
