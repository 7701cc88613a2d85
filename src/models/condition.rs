//! Closed categorization of weather conditions

use serde::{Deserialize, Serialize};

/// Coarse condition category used by presentation layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConditionCategory {
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Thunderstorm,
    Snow,
    /// Mist, fog, haze and other atmospheric obscuration
    Mist,
    #[default]
    Unknown,
}

impl ConditionCategory {
    /// Categorize a condition string such as "Clouds" or "light rain".
    /// The first matching keyword wins; unrecognized text is `Unknown`.
    pub fn from_condition(condition: &str) -> Self {
        let condition = condition.to_lowercase();

        if condition.contains("clear") {
            Self::Clear
        } else if condition.contains("cloud") {
            Self::Clouds
        } else if condition.contains("rain") {
            Self::Rain
        } else if condition.contains("drizzle") {
            Self::Drizzle
        } else if condition.contains("thunder") {
            Self::Thunderstorm
        } else if condition.contains("snow") {
            Self::Snow
        } else if condition.contains("mist")
            || condition.contains("fog")
            || condition.contains("haze")
        {
            Self::Mist
        } else {
            Self::Unknown
        }
    }

    /// Categorize an OpenWeatherMap condition id by its group
    /// See: https://openweathermap.org/weather-conditions
    pub fn from_code(id: u32) -> Self {
        match id {
            200..=299 => Self::Thunderstorm,
            300..=399 => Self::Drizzle,
            500..=599 => Self::Rain,
            600..=699 => Self::Snow,
            700..=799 => Self::Mist,
            800 => Self::Clear,
            801..=899 => Self::Clouds,
            _ => Self::Unknown,
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::Clouds => "Cloudy",
            Self::Rain => "Rain",
            Self::Drizzle => "Drizzle",
            Self::Thunderstorm => "Thunderstorm",
            Self::Snow => "Snow",
            Self::Mist => "Mist",
            Self::Unknown => "Unknown",
        }
    }
}
