//! Data models for farmcast
//!
//! This module contains the core domain models organized by concern:
//! - Location: queries, geocoding candidates and resolved coordinates
//! - Weather: current conditions and forecast samples
//! - Condition: closed categorization of condition strings and ids

pub mod condition;
pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use condition::ConditionCategory;
pub use location::{Coordinates, GeoCandidate, LocationQuery, ResolvedLocation};
pub use weather::{CurrentConditions, ForecastSample, ForecastSeries, RawForecast, WeatherReport};
