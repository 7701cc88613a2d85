//! Farming advisories derived from current conditions
//!
//! Advisory selection is first-match over a fixed, priority-ordered rule
//! list; soil moisture is classified independently. Both are pure
//! functions of `CurrentConditions`.

use crate::models::CurrentConditions;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Above this temperature (°C) heat is extreme regardless of humidity
pub const EXTREME_HEAT_C: f64 = 35.0;
/// Above this temperature (°C) combined with dry air, sensitive crops need water
pub const HOT_C: f64 = 30.0;
/// Humidity (%) below which hot air counts as dry
pub const DRY_AIR_PCT: f64 = 40.0;
/// Below this temperature (°C) frost protection is advised
pub const FROST_C: f64 = 5.0;
/// Wind speed (m/s) above which spraying should stop
pub const HIGH_WIND_MS: f64 = 6.0;

/// One advisory, mutually exclusive with the others
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Advisory {
    Rainfall,
    ExtremeHeat,
    HeatAndDry,
    Frost,
    HighWind,
    Optimal,
    Favorable,
}

impl Advisory {
    /// Apply the rule list in priority order; the first match wins
    pub fn derive(conditions: &CurrentConditions) -> Self {
        let temp = conditions.temperature_c;
        let humidity = conditions.humidity_pct;

        if is_raining(conditions) {
            Advisory::Rainfall
        } else if temp > EXTREME_HEAT_C {
            Advisory::ExtremeHeat
        } else if temp > HOT_C && humidity < DRY_AIR_PCT {
            Advisory::HeatAndDry
        } else if temp < FROST_C {
            Advisory::Frost
        } else if conditions.wind_speed_ms > HIGH_WIND_MS {
            Advisory::HighWind
        } else if (20.0..=30.0).contains(&temp) && (50.0..=80.0).contains(&humidity) {
            Advisory::Optimal
        } else {
            Advisory::Favorable
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Advisory::Rainfall => "Rainfall expected",
            Advisory::ExtremeHeat => "Extreme heat",
            Advisory::HeatAndDry => "Hot and dry",
            Advisory::Frost => "Cold / frost risk",
            Advisory::HighWind => "High winds",
            Advisory::Optimal => "Optimal growing conditions",
            Advisory::Favorable => "Favorable conditions",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            Advisory::Rainfall => {
                "Natural irrigation today. Postpone field work and avoid spraying pesticides or fertilizer."
            }
            Advisory::ExtremeHeat => {
                "Irrigate in the early morning or evening and provide shade for livestock and seedlings."
            }
            Advisory::HeatAndDry => {
                "Increase irrigation for sensitive crops and mulch to reduce evaporation."
            }
            Advisory::Frost => {
                "Protect sensitive plants from frost and delay sowing of warm-season crops."
            }
            Advisory::HighWind => {
                "Do not spray today. Secure loose items, young plants and support structures."
            }
            Advisory::Optimal => {
                "Good conditions for planting, transplanting and most field operations."
            }
            Advisory::Favorable => {
                "Conditions are suitable for routine farm work. Monitor crops as usual."
            }
        }
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// Estimated soil moisture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoilMoisture {
    /// High / waterlogged
    High,
    Moderate,
    /// Low / dry
    Low,
}

impl SoilMoisture {
    pub fn derive(conditions: &CurrentConditions) -> Self {
        if is_raining(conditions) || conditions.humidity_pct > 80.0 {
            SoilMoisture::High
        } else if conditions.humidity_pct < 30.0 || conditions.temperature_c > 32.0 {
            SoilMoisture::Low
        } else {
            SoilMoisture::Moderate
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SoilMoisture::High => "High (possibly waterlogged)",
            SoilMoisture::Moderate => "Moderate",
            SoilMoisture::Low => "Low (dry)",
        }
    }
}

impl fmt::Display for SoilMoisture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Advisory plus soil moisture for one set of current conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryReport {
    pub advisory: Advisory,
    pub soil_moisture: SoilMoisture,
}

impl AdvisoryReport {
    pub fn derive(conditions: &CurrentConditions) -> Self {
        Self {
            advisory: Advisory::derive(conditions),
            soil_moisture: SoilMoisture::derive(conditions),
        }
    }
}

/// Condition group or description mentions rain
fn is_raining(conditions: &CurrentConditions) -> bool {
    [&conditions.condition_main, &conditions.description]
        .iter()
        .any(|text| text.to_lowercase().contains("rain"))
}
