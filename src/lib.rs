//! `farmcast` - Weather lookup and farming advisories
//!
//! This library resolves free-text locations or coordinates through the
//! OpenWeatherMap geocoding API, fetches current conditions and a multi-day
//! forecast, and derives agricultural advisories from the current conditions.

pub mod advisory;
pub mod api;
pub mod config;
pub mod error;
pub mod forecast;
pub mod geolocation;
pub mod greeting;
pub mod location_resolver;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod session;
pub mod suggestions;
pub mod weather;

// Re-export core types for public API
pub use advisory::{Advisory, AdvisoryReport, SoilMoisture};
pub use api::{WeatherApiClient, WeatherSource};
pub use config::FarmcastConfig;
pub use error::FarmcastError;
pub use forecast::{ForecastNormalizer, SamplingPolicy};
pub use geolocation::{FixedGeolocation, GeolocationProvider, NoGeolocation};
pub use greeting::{DayPeriod, GreetingClock};
pub use location_resolver::LocationResolver;
pub use models::{
    ConditionCategory, Coordinates, CurrentConditions, ForecastSeries, LocationQuery,
    ResolvedLocation, WeatherReport,
};
pub use pipeline::WeatherQueryPipeline;
pub use session::{QueryOutcome, QuerySession, SessionState};
pub use suggestions::{CitySuggestion, SuggestionLookup, SuggestionOutcome};
pub use weather::WeatherFetcher;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, FarmcastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
