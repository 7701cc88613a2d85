//! Weather API client for OpenWeatherMap
//!
//! This module provides async HTTP access to the four read-only endpoints the
//! pipeline needs: forward geocoding, reverse geocoding, current conditions
//! and the 5 day / 3 hour forecast. Every response carries a `cod` status
//! field that is checked before the payload is trusted.

use crate::config::WeatherConfig;
use crate::models::{Coordinates, CurrentConditions, GeoCandidate, LocationQuery, RawForecast};
use crate::{FarmcastError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

pub(crate) const CURRENT_FALLBACK_MESSAGE: &str = "Failed to fetch weather data";
pub(crate) const FORECAST_FALLBACK_MESSAGE: &str = "Failed to fetch forecast data";
pub(crate) const GEOCODING_FALLBACK_MESSAGE: &str = "Failed to look up location";

/// Read-only access to a weather and geocoding service
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Forward geocoding: place name to candidates, in service order
    async fn geocode(&self, query: &str, limit: u32) -> Result<Vec<GeoCandidate>>;

    /// Reverse geocoding: coordinates to candidates, in service order
    async fn reverse_geocode(&self, coordinates: Coordinates, limit: u32)
    -> Result<Vec<GeoCandidate>>;

    /// Current conditions by coordinates or by name
    async fn current_conditions(&self, location: &LocationQuery) -> Result<CurrentConditions>;

    /// Sub-daily forecast by coordinates or by name
    async fn forecast(&self, location: &LocationQuery) -> Result<RawForecast>;
}

/// OpenWeatherMap client
#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    client: Client,
    api_key: String,
    base_url: String,
    geo_base_url: String,
}

impl WeatherApiClient {
    /// Create a new client. Fails when no API key is configured.
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                FarmcastError::config("Missing weather API key. Set FARMCAST_WEATHER__API_KEY.")
            })?;

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("farmcast/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            geo_base_url: config.geo_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn location_params(location: &LocationQuery) -> String {
        match location {
            LocationQuery::Coordinates(coords) => {
                format!("lat={}&lon={}", coords.latitude, coords.longitude)
            }
            LocationQuery::Name(name) => format!("q={}", urlencoding::encode(name)),
        }
    }

    fn weather_url(&self, endpoint: &str, location: &LocationQuery) -> String {
        format!(
            "{}/{}?{}&units=metric&appid={}",
            self.base_url,
            endpoint,
            Self::location_params(location),
            self.api_key
        )
    }

    /// Issue a GET and decode the body, mapping non-success statuses to
    /// `FarmcastError::Upstream`
    async fn get_json<T: DeserializeOwned>(&self, url: &str, fallback: &str) -> Result<T> {
        debug!("Requesting {}", redact(url));
        let start_time = Instant::now();

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        debug!(
            "HTTP response received: {} in {:.3}s",
            status,
            start_time.elapsed().as_secs_f64()
        );

        let envelope = openweather::Envelope::parse(&body);

        if !status.is_success() {
            let message = envelope.and_then(|e| e.message()).unwrap_or_else(|| fallback.to_string());
            warn!("Weather service returned HTTP {}: {}", status, message);
            return Err(FarmcastError::upstream(message));
        }

        if let Some(envelope) = envelope {
            if !envelope.is_success() {
                let message = envelope.message().unwrap_or_else(|| fallback.to_string());
                warn!("Weather service reported failure: {}", message);
                return Err(FarmcastError::upstream(message));
            }
        }

        serde_json::from_slice(&body).map_err(|e| {
            warn!("Failed to parse weather service response: {}", e);
            FarmcastError::decode(format!("{fallback}: {e}"))
        })
    }
}

#[async_trait]
impl WeatherSource for WeatherApiClient {
    #[instrument(skip(self))]
    async fn geocode(&self, query: &str, limit: u32) -> Result<Vec<GeoCandidate>> {
        let url = format!(
            "{}/direct?q={}&limit={}&appid={}",
            self.geo_base_url,
            urlencoding::encode(query),
            limit,
            self.api_key
        );

        let candidates: Vec<GeoCandidate> = self.get_json(&url, GEOCODING_FALLBACK_MESSAGE).await?;

        if candidates.is_empty() {
            debug!("No geocoding results for '{}'", query);
        } else {
            debug!(
                "Geocoding results: {:?}",
                candidates
                    .iter()
                    .map(|c| format!("{} ({:.4}, {:.4})", c.name, c.latitude, c.longitude))
                    .collect::<Vec<_>>()
            );
        }

        Ok(candidates)
    }

    #[instrument(skip(self))]
    async fn reverse_geocode(
        &self,
        coordinates: Coordinates,
        limit: u32,
    ) -> Result<Vec<GeoCandidate>> {
        let url = format!(
            "{}/reverse?lat={}&lon={}&limit={}&appid={}",
            self.geo_base_url, coordinates.latitude, coordinates.longitude, limit, self.api_key
        );

        self.get_json(&url, GEOCODING_FALLBACK_MESSAGE).await
    }

    #[instrument(skip(self, location), fields(location = %location))]
    async fn current_conditions(&self, location: &LocationQuery) -> Result<CurrentConditions> {
        let url = self.weather_url("weather", location);
        let response: openweather::CurrentResponse =
            self.get_json(&url, CURRENT_FALLBACK_MESSAGE).await?;

        let current = CurrentConditions::from(response);
        info!(
            "Current conditions for {}: {} {:.1}°C",
            current.location_name, current.condition_main, current.temperature_c
        );
        Ok(current)
    }

    #[instrument(skip(self, location), fields(location = %location))]
    async fn forecast(&self, location: &LocationQuery) -> Result<RawForecast> {
        let url = self.weather_url("forecast", location);
        let response: openweather::ForecastResponse =
            self.get_json(&url, FORECAST_FALLBACK_MESSAGE).await?;

        let forecast = RawForecast::try_from(response)?;
        info!("Retrieved forecast with {} samples", forecast.len());
        Ok(forecast)
    }
}

/// Strip the API key from a URL before it is logged
fn redact(url: &str) -> &str {
    url.split("appid=").next().unwrap_or(url)
}

/// OpenWeatherMap wire formats and conversion to internal models
mod openweather {
    use crate::FarmcastError;
    use crate::models::{CurrentConditions, ForecastSample, RawForecast};
    use chrono::DateTime;
    use serde::Deserialize;
    use serde_json::Value;

    /// `cod` is a number on /weather and a string on /forecast
    #[derive(Debug, Deserialize)]
    #[serde(untagged)]
    pub enum StatusCode {
        Number(u16),
        Text(String),
    }

    impl StatusCode {
        pub fn is_success(&self) -> bool {
            let code = match self {
                StatusCode::Number(code) => Some(*code),
                StatusCode::Text(text) => text.trim().parse::<u16>().ok(),
            };
            code.is_some_and(|code| (200..300).contains(&code))
        }
    }

    /// Status fields shared by every object response
    #[derive(Debug, Deserialize)]
    pub struct Envelope {
        pub cod: Option<StatusCode>,
        /// A string on errors, a number on successful forecasts
        pub message: Option<Value>,
    }

    impl Envelope {
        /// `None` for bodies that are not JSON objects (geocoding arrays)
        pub fn parse(body: &[u8]) -> Option<Self> {
            serde_json::from_slice(body).ok()
        }

        pub fn is_success(&self) -> bool {
            self.cod.as_ref().is_none_or(StatusCode::is_success)
        }

        pub fn message(&self) -> Option<String> {
            match &self.message {
                Some(Value::String(message)) if !message.is_empty() => Some(message.clone()),
                _ => None,
            }
        }
    }

    #[derive(Debug, Deserialize, Default)]
    pub struct Condition {
        pub id: u32,
        pub main: String,
        pub description: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct Main {
        pub temp: f64,
        pub feels_like: f64,
        pub humidity: f64,
        #[serde(default)]
        pub pressure: f64,
    }

    #[derive(Debug, Deserialize, Default)]
    pub struct Wind {
        pub speed: f64,
    }

    /// Current weather response
    #[derive(Debug, Deserialize)]
    pub struct CurrentResponse {
        #[serde(default)]
        pub name: String,
        #[serde(default)]
        pub weather: Vec<Condition>,
        pub main: Main,
        #[serde(default)]
        pub wind: Wind,
    }

    /// 5 day / 3 hour forecast response
    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        #[serde(default)]
        pub list: Vec<ForecastItem>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastItem {
        /// Unix timestamp, UTC
        pub dt: i64,
        pub main: Main,
        #[serde(default)]
        pub weather: Vec<Condition>,
    }

    impl From<CurrentResponse> for CurrentConditions {
        fn from(response: CurrentResponse) -> Self {
            let condition = response.weather.into_iter().next().unwrap_or_default();
            CurrentConditions {
                location_name: response.name,
                condition_main: condition.main,
                condition_id: condition.id,
                description: condition.description,
                temperature_c: response.main.temp,
                feels_like_c: response.main.feels_like,
                humidity_pct: response.main.humidity,
                wind_speed_ms: response.wind.speed,
                pressure_hpa: response.main.pressure,
            }
        }
    }

    impl TryFrom<ForecastItem> for ForecastSample {
        type Error = FarmcastError;

        fn try_from(item: ForecastItem) -> Result<Self, Self::Error> {
            let timestamp = DateTime::from_timestamp(item.dt, 0).ok_or_else(|| {
                FarmcastError::decode(format!("Invalid forecast timestamp: {}", item.dt))
            })?;
            let condition = item.weather.into_iter().next().unwrap_or_default();
            Ok(ForecastSample {
                timestamp,
                condition_main: condition.main,
                description: condition.description,
                temperature_c: item.main.temp,
                feels_like_c: item.main.feels_like,
                humidity_pct: item.main.humidity,
            })
        }
    }

    impl TryFrom<ForecastResponse> for RawForecast {
        type Error = FarmcastError;

        fn try_from(response: ForecastResponse) -> Result<Self, Self::Error> {
            let samples = response
                .list
                .into_iter()
                .map(ForecastSample::try_from)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(RawForecast::new(samples))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use serde_json::json;

        #[test]
        fn test_status_code_variants() {
            let envelope = Envelope::parse(br#"{"cod": 200}"#).unwrap();
            assert!(envelope.is_success());

            let envelope = Envelope::parse(br#"{"cod": "200", "message": 0}"#).unwrap();
            assert!(envelope.is_success());
            assert_eq!(envelope.message(), None);

            let envelope =
                Envelope::parse(br#"{"cod": "404", "message": "city not found"}"#).unwrap();
            assert!(!envelope.is_success());
            assert_eq!(envelope.message().as_deref(), Some("city not found"));

            let envelope = Envelope::parse(br#"{"cod": 401, "message": ""}"#).unwrap();
            assert!(!envelope.is_success());
            assert_eq!(envelope.message(), None);
        }

        #[test]
        fn test_array_body_has_no_envelope() {
            assert!(Envelope::parse(br#"[{"name": "Mumbai"}]"#).is_none());
            assert!(Envelope::parse(b"[]").is_none());
        }

        #[test]
        fn test_current_response_conversion() {
            let response: CurrentResponse = serde_json::from_value(json!({
                "cod": 200,
                "name": "Mumbai",
                "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}],
                "main": {"temp": 34.0, "feels_like": 38.2, "humidity": 45, "pressure": 1008},
                "wind": {"speed": 3.0, "deg": 270}
            }))
            .unwrap();

            let current = CurrentConditions::from(response);
            assert_eq!(current.location_name, "Mumbai");
            assert_eq!(current.condition_main, "Clear");
            assert_eq!(current.condition_id, 800);
            assert_eq!(current.temperature_c, 34.0);
            assert_eq!(current.humidity_pct, 45.0);
            assert_eq!(current.wind_speed_ms, 3.0);
            assert_eq!(current.pressure_hpa, 1008.0);
        }

        #[test]
        fn test_current_response_without_conditions() {
            let response: CurrentResponse = serde_json::from_value(json!({
                "main": {"temp": 10.0, "feels_like": 9.0, "humidity": 70, "pressure": 1015}
            }))
            .unwrap();

            let current = CurrentConditions::from(response);
            assert_eq!(current.condition_main, "");
            assert_eq!(current.condition_id, 0);
            assert_eq!(current.wind_speed_ms, 0.0);
        }

        #[test]
        fn test_forecast_response_conversion() {
            let response: ForecastResponse = serde_json::from_value(json!({
                "cod": "200",
                "message": 0,
                "cnt": 2,
                "list": [
                    {
                        "dt": 1736164800,
                        "main": {"temp": 21.5, "feels_like": 21.0, "humidity": 60},
                        "weather": [{"id": 500, "main": "Rain", "description": "light rain"}],
                        "dt_txt": "2025-01-06 12:00:00"
                    },
                    {
                        "dt": 1736175600,
                        "main": {"temp": 19.0, "feels_like": 18.4, "humidity": 72},
                        "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds"}],
                        "dt_txt": "2025-01-06 15:00:00"
                    }
                ]
            }))
            .unwrap();

            let forecast = RawForecast::try_from(response).unwrap();
            assert_eq!(forecast.len(), 2);
            assert_eq!(
                forecast.samples[0].timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                "2025-01-06 12:00:00"
            );
            assert_eq!(forecast.samples[0].condition_main, "Rain");
            assert_eq!(forecast.samples[1].humidity_pct, 72.0);
        }
    }
}
