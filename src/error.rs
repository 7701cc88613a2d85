//! Error types and handling for the farmcast pipeline

use thiserror::Error;

/// Main error type for the farmcast library
#[derive(Error, Debug)]
pub enum FarmcastError {
    /// No location text was entered
    #[error("Empty location query")]
    EmptyQuery,

    /// Geocoding returned no candidates, even after the broadened retry
    #[error("Location not found: {query}")]
    LocationNotFound { query: String },

    /// The weather service answered with a non-success status
    #[error("Upstream error: {message}")]
    Upstream { message: String },

    /// The device has no location capability
    #[error("Geolocation is not available")]
    GeolocationUnavailable,

    /// The user declined to share their location
    #[error("Geolocation permission denied")]
    GeolocationDenied,

    /// HTTP transport failures (connect, timeout, body read)
    #[error("Transport error: {source}")]
    Transport {
        #[from]
        source: reqwest::Error,
    },

    /// A response body that could not be decoded
    #[error("Invalid response: {message}")]
    Decode { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl FarmcastError {
    /// Create a new location-not-found error
    pub fn location_not_found<S: Into<String>>(query: S) -> Self {
        Self::LocationNotFound {
            query: query.into(),
        }
    }

    /// Create a new upstream error
    pub fn upstream<S: Into<String>>(message: S) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    /// Create a new decode error
    pub fn decode<S: Into<String>>(message: S) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            FarmcastError::EmptyQuery => "Please enter a location.".to_string(),
            FarmcastError::LocationNotFound { query } => format!(
                "Could not find \"{query}\". Try a nearby larger city or town."
            ),
            FarmcastError::Upstream { message } => message.clone(),
            FarmcastError::GeolocationUnavailable => {
                "Geolocation is not supported on this device.".to_string()
            }
            FarmcastError::GeolocationDenied => {
                "Unable to retrieve your location. Please allow location access or search by city."
                    .to_string()
            }
            FarmcastError::Transport { .. } => {
                "Unable to reach the weather service. Please check your internet connection."
                    .to_string()
            }
            FarmcastError::Decode { .. } => {
                "The weather service returned unexpected data. Please try again.".to_string()
            }
            FarmcastError::Config { .. } => {
                "Configuration error. Please check your config file and API key.".to_string()
            }
        }
    }
}
