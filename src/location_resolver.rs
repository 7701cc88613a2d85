//! Location Resolution Module
//!
//! This module turns a location query (a place name or a coordinate pair)
//! into the single coordinate pair used for weather lookup.

use crate::api::WeatherSource;
use crate::models::{Coordinates, LocationQuery, ResolvedLocation};
use crate::{FarmcastError, Result};
use tracing::{debug, info, instrument, warn};

/// Result limit of the first forward geocoding attempt
pub const FIRST_PASS_LIMIT: u32 = 1;
/// Result limit of the broadened second attempt
pub const FALLBACK_LIMIT: u32 = 5;
/// Result limit of reverse geocoding
pub const REVERSE_LIMIT: u32 = 1;

/// Service for resolving location queries
pub struct LocationResolver;

impl LocationResolver {
    /// Resolve a location query into a single coordinate pair and display name
    #[instrument(skip(source))]
    pub async fn resolve_location(
        source: &dyn WeatherSource,
        query: &LocationQuery,
    ) -> Result<ResolvedLocation> {
        let location = match query {
            LocationQuery::Coordinates(coords) => Self::resolve_coordinates(source, *coords).await,
            LocationQuery::Name(name) => {
                let city = query.city_token().unwrap_or_default();
                Self::resolve_name(source, city, name).await?
            }
        };

        debug!(
            "Resolved location: '{}' at ({}, {})",
            location.display_name, location.latitude, location.longitude
        );

        Ok(location)
    }

    /// Reverse path. Never fails: without a usable candidate the raw
    /// coordinates are kept with an empty display name.
    async fn resolve_coordinates(
        source: &dyn WeatherSource,
        coordinates: Coordinates,
    ) -> ResolvedLocation {
        debug!("Reverse geocoding coordinates: {}", coordinates.format());

        match source.reverse_geocode(coordinates, REVERSE_LIMIT).await {
            Ok(candidates) => match candidates.into_iter().next() {
                Some(candidate) => ResolvedLocation::new(coordinates, candidate.display_name()),
                None => {
                    debug!("No reverse geocoding results found, keeping raw coordinates");
                    ResolvedLocation::new(coordinates, String::new())
                }
            },
            Err(e) => {
                warn!("Reverse geocoding failed: {}, keeping raw coordinates", e);
                ResolvedLocation::new(coordinates, String::new())
            }
        }
    }

    /// Forward path: leading city token, one narrow lookup, then one broader
    async fn resolve_name(
        source: &dyn WeatherSource,
        city: &str,
        name: &str,
    ) -> Result<ResolvedLocation> {
        if city.is_empty() {
            return Err(FarmcastError::EmptyQuery);
        }

        debug!("Geocoding location name: {}", city);

        let mut candidates = source.geocode(city, FIRST_PASS_LIMIT).await?;
        if candidates.is_empty() {
            info!(
                "No results for '{}', retrying with limit {}",
                city, FALLBACK_LIMIT
            );
            candidates = source.geocode(city, FALLBACK_LIMIT).await?;
        }

        let Some(candidate) = candidates.into_iter().next() else {
            warn!("Location not found: {}", name);
            return Err(FarmcastError::location_not_found(name));
        };

        info!(
            "Found location: {} ({:.4}, {:.4})",
            candidate.name, candidate.latitude, candidate.longitude
        );

        Ok(ResolvedLocation::from(candidate))
    }
}
