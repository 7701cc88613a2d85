//! Configuration management for farmcast
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::FarmcastError;
use crate::forecast::SamplingPolicy;
use anyhow::{Context, Result};
use chrono::NaiveTime;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure for farmcast
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FarmcastConfig {
    /// Weather API configuration
    pub weather: WeatherConfig,
    /// Forecast normalization settings
    pub forecast: ForecastConfig,
    /// Advisory derivation settings
    pub advisory: AdvisoryConfig,
    /// City suggestion settings
    pub suggestions: SuggestionConfig,
    /// Greeting clock settings
    pub greeting: GreetingConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Fixed device position, if any
    pub location: LocationConfig,
}

/// Weather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key
    pub api_key: Option<String>,
    /// Base URL for the weather endpoints
    pub base_url: String,
    /// Base URL for the geocoding endpoints
    pub geo_base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
}

/// Forecast normalization settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Sampling policy name (stride or time_of_day)
    pub policy: String,
    /// Samples per day; 0 infers it from the forecast interval
    pub stride: usize,
    /// Time-of-day marker used by the time_of_day policy
    pub marker: String,
    /// Maximum number of days in a normalized series
    pub max_days: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisoryConfig {
    pub enabled: bool,
}

/// City suggestion settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    /// Minimum input length, in characters, before a lookup is made
    pub min_chars: usize,
    /// Maximum number of suggestions requested
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GreetingConfig {
    pub refresh_seconds: u64,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

/// Position reported by the fixed geolocation provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

// Default value functions
fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_geo_base_url() -> String {
    "https://api.openweathermap.org/geo/1.0".to_string()
}

fn default_weather_timeout() -> u32 {
    30
}

fn default_forecast_policy() -> String {
    "stride".to_string()
}

fn default_forecast_stride() -> usize {
    8
}

fn default_forecast_marker() -> String {
    "12:00:00".to_string()
}

fn default_forecast_max_days() -> usize {
    7
}

fn default_suggestion_min_chars() -> usize {
    3
}

fn default_suggestion_limit() -> u32 {
    5
}

fn default_greeting_refresh() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            geo_base_url: default_geo_base_url(),
            timeout_seconds: default_weather_timeout(),
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            policy: default_forecast_policy(),
            stride: default_forecast_stride(),
            marker: default_forecast_marker(),
            max_days: default_forecast_max_days(),
        }
    }
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            min_chars: default_suggestion_min_chars(),
            limit: default_suggestion_limit(),
        }
    }
}

impl Default for GreetingConfig {
    fn default() -> Self {
        Self {
            refresh_seconds: default_greeting_refresh(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl WeatherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }
}

impl ForecastConfig {
    /// Build the sampling policy these settings describe
    pub fn sampling_policy(&self) -> crate::Result<SamplingPolicy> {
        match self.policy.as_str() {
            "stride" => Ok(SamplingPolicy::Stride {
                stride: (self.stride > 0).then_some(self.stride),
            }),
            "time_of_day" => {
                let marker = NaiveTime::parse_from_str(&self.marker, "%H:%M:%S").map_err(|e| {
                    FarmcastError::config(format!(
                        "Invalid forecast marker '{}': {e}",
                        self.marker
                    ))
                })?;
                Ok(SamplingPolicy::TimeOfDay { marker })
            }
            other => Err(FarmcastError::config(format!(
                "Invalid forecast policy '{other}'. Must be one of: stride, time_of_day"
            ))),
        }
    }
}

impl FarmcastConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("farmcast.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // FARMCAST_WEATHER__API_KEY=... and friends
        builder = builder.add_source(
            Environment::with_prefix("FARMCAST")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: FarmcastConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("farmcast").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.geo_base_url.is_empty() {
            self.weather.geo_base_url = default_geo_base_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.forecast.policy.is_empty() {
            self.forecast.policy = default_forecast_policy();
        }
        if self.forecast.marker.is_empty() {
            self.forecast.marker = default_forecast_marker();
        }
        if self.forecast.max_days == 0 {
            self.forecast.max_days = default_forecast_max_days();
        }
        if self.suggestions.limit == 0 {
            self.suggestions.limit = default_suggestion_limit();
        }
        if self.greeting.refresh_seconds == 0 {
            self.greeting.refresh_seconds = default_greeting_refresh();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> crate::Result<()> {
        self.validate_api_key()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.forecast.sampling_policy()?;
        Ok(())
    }

    /// Validate the API key, if one is configured
    pub fn validate_api_key(&self) -> crate::Result<()> {
        if let Some(api_key) = &self.weather.api_key {
            if api_key.trim().is_empty() {
                return Err(FarmcastError::config(
                    "Weather API key cannot be empty if provided. Either remove it or provide a valid key.",
                ));
            }

            if api_key.len() > 100 {
                return Err(FarmcastError::config(
                    "Weather API key appears to be invalid (too long). Please check your API key.",
                ));
            }
        }

        Ok(())
    }

    fn validate_numeric_ranges(&self) -> crate::Result<()> {
        if self.weather.timeout_seconds > 300 {
            return Err(FarmcastError::config(
                "Weather API timeout cannot exceed 300 seconds",
            ));
        }

        if !(1..=7).contains(&self.forecast.max_days) {
            return Err(FarmcastError::config(
                "Forecast max days must be between 1 and 7",
            ));
        }

        if self.suggestions.limit > 5 {
            return Err(FarmcastError::config(
                "Suggestion limit cannot exceed 5",
            ));
        }

        match (self.location.latitude, self.location.longitude) {
            (Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                    return Err(FarmcastError::config(format!(
                        "Configured location ({lat}, {lon}) is out of range"
                    )));
                }
            }
            (None, None) => {}
            _ => {
                return Err(FarmcastError::config(
                    "Configured location needs both latitude and longitude",
                ));
            }
        }

        Ok(())
    }

    fn validate_string_values(&self) -> crate::Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(FarmcastError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(FarmcastError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            )));
        }

        for url in [&self.weather.base_url, &self.weather.geo_base_url] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(FarmcastError::config(format!(
                    "Weather API URL '{url}' must be a valid HTTP or HTTPS URL"
                )));
            }
        }

        Ok(())
    }
}
