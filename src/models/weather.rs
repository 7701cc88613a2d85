//! Weather data models and display methods

use super::{ConditionCategory, ResolvedLocation};
use crate::advisory::AdvisoryReport;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Current conditions at one location
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CurrentConditions {
    /// Name reported by the weather service for the station/city
    pub location_name: String,
    /// Condition group, e.g. "Rain" or "Clear"
    pub condition_main: String,
    /// Numeric condition id from the API
    pub condition_id: u32,
    /// Free-text description, e.g. "light rain"
    pub description: String,
    /// Temperature in Celsius
    pub temperature_c: f64,
    /// Apparent temperature in Celsius
    pub feels_like_c: f64,
    /// Relative humidity percentage
    pub humidity_pct: f64,
    /// Wind speed in m/s
    pub wind_speed_ms: f64,
    /// Atmospheric pressure in hPa
    pub pressure_hpa: f64,
}

impl CurrentConditions {
    pub fn category(&self) -> ConditionCategory {
        ConditionCategory::from_code(self.condition_id)
    }

    /// Format temperature rounded to whole degrees
    pub fn format_temperature(&self) -> String {
        format!("{:.0}°C", self.temperature_c.round())
    }

    pub fn format_feels_like(&self) -> String {
        format!("{:.0}°C", self.feels_like_c.round())
    }

    pub fn format_wind(&self) -> String {
        format!("{} m/s", self.wind_speed_ms)
    }

    pub fn format_pressure(&self) -> String {
        format!("{} hPa", self.pressure_hpa)
    }
}

/// One forecast slot
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastSample {
    pub timestamp: DateTime<Utc>,
    pub condition_main: String,
    pub description: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: f64,
}

impl ForecastSample {
    /// Calendar day (UTC) this sample belongs to
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    pub fn category(&self) -> ConditionCategory {
        ConditionCategory::from_condition(&self.condition_main)
    }

    /// Short day label like "Mon, Jan 6"
    pub fn format_day(&self) -> String {
        self.timestamp.format("%a, %b %-d").to_string()
    }
}

/// Forecast as delivered by the API, at sub-daily granularity
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct RawForecast {
    /// Samples in API order
    pub samples: Vec<ForecastSample>,
}

impl RawForecast {
    pub fn new(samples: Vec<ForecastSample>) -> Self {
        Self { samples }
    }

    /// Spacing between the first two samples, if there are two with a
    /// positive gap
    pub fn interval(&self) -> Option<Duration> {
        let gap = match self.samples.as_slice() {
            [first, second, ..] => (second.timestamp - first.timestamp).to_std().ok(),
            _ => None,
        };
        gap.filter(|gap| !gap.is_zero())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// One sample per calendar day, in chronological order
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ForecastSeries {
    pub days: Vec<ForecastSample>,
}

impl ForecastSeries {
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ForecastSample> {
        self.days.iter()
    }
}

/// Everything one successful query produces
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherReport {
    pub location: ResolvedLocation,
    pub current: CurrentConditions,
    pub forecast: ForecastSeries,
    /// Present when advisory derivation is enabled
    pub advisory: Option<AdvisoryReport>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_at(hour: u32) -> ForecastSample {
        ForecastSample {
            timestamp: Utc.with_ymd_and_hms(2025, 1, 6, hour, 0, 0).unwrap(),
            condition_main: "Clouds".to_string(),
            description: "scattered clouds".to_string(),
            temperature_c: 21.4,
            feels_like_c: 21.0,
            humidity_pct: 60.0,
        }
    }

    #[test]
    fn test_raw_forecast_interval() {
        let raw = RawForecast::new(vec![sample_at(0), sample_at(3), sample_at(6)]);
        assert_eq!(raw.interval(), Some(Duration::from_secs(3 * 3600)));

        assert_eq!(RawForecast::new(vec![sample_at(0)]).interval(), None);
        assert_eq!(
            RawForecast::new(vec![sample_at(3), sample_at(3)]).interval(),
            None
        );
        assert_eq!(
            RawForecast::new(vec![sample_at(6), sample_at(3)]).interval(),
            None
        );
    }

    #[test]
    fn test_format_day() {
        assert_eq!(sample_at(12).format_day(), "Mon, Jan 6");
    }

    #[test]
    fn test_forecast_sample_category() {
        assert_eq!(sample_at(12).category(), ConditionCategory::Clouds);

        let rainy = ForecastSample {
            condition_main: "Rain".to_string(),
            ..sample_at(15)
        };
        assert_eq!(rainy.category(), ConditionCategory::Rain);
    }

    #[test]
    fn test_format_current() {
        let current = CurrentConditions {
            location_name: "Mumbai".to_string(),
            condition_main: "Clear".to_string(),
            condition_id: 800,
            description: "clear sky".to_string(),
            temperature_c: 33.6,
            feels_like_c: 37.2,
            humidity_pct: 45.0,
            wind_speed_ms: 3.1,
            pressure_hpa: 1008.0,
        };
        assert_eq!(current.format_temperature(), "34°C");
        assert_eq!(current.format_feels_like(), "37°C");
        assert_eq!(current.format_wind(), "3.1 m/s");
        assert_eq!(current.format_pressure(), "1008 hPa");
        assert_eq!(current.category(), ConditionCategory::Clear);
    }
}
