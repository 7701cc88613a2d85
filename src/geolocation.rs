//! Device position providers

use crate::config::LocationConfig;
use crate::models::Coordinates;
use crate::{FarmcastError, Result};
use async_trait::async_trait;

/// Source of the device's current position
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    /// Current position, or `GeolocationUnavailable` / `GeolocationDenied`
    async fn current_position(&self) -> Result<Coordinates>;
}

/// Reports a fixed position, e.g. one taken from configuration
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocation {
    coordinates: Coordinates,
}

impl FixedGeolocation {
    pub fn new(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }

    /// `None` unless both latitude and longitude are configured
    pub fn from_config(config: &LocationConfig) -> Option<Self> {
        match (config.latitude, config.longitude) {
            (Some(latitude), Some(longitude)) => {
                Some(Self::new(Coordinates::new(latitude, longitude)))
            }
            _ => None,
        }
    }
}

#[async_trait]
impl GeolocationProvider for FixedGeolocation {
    async fn current_position(&self) -> Result<Coordinates> {
        Ok(self.coordinates)
    }
}

/// A device without location capability
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeolocation;

#[async_trait]
impl GeolocationProvider for NoGeolocation {
    async fn current_position(&self) -> Result<Coordinates> {
        Err(FarmcastError::GeolocationUnavailable)
    }
}
