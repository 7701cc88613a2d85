//! Weather retrieval: current conditions and raw forecast for one position

use crate::api::WeatherSource;
use crate::models::{Coordinates, CurrentConditions, LocationQuery, RawForecast};
use crate::Result;
use futures::future::try_join;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Fetches both weather payloads for a resolved position
pub struct WeatherFetcher;

impl WeatherFetcher {
    /// Issue the current-conditions and forecast requests concurrently.
    /// Both must succeed; the first failure fails the whole fetch and the
    /// other result is dropped.
    #[instrument(skip(source, coordinates), fields(coordinates = %coordinates.format()))]
    pub async fn fetch(
        source: &dyn WeatherSource,
        coordinates: Coordinates,
    ) -> Result<(CurrentConditions, RawForecast)> {
        let location = LocationQuery::Coordinates(coordinates);
        let start_time = Instant::now();

        let result = try_join(
            source.current_conditions(&location),
            source.forecast(&location),
        )
        .await;

        match &result {
            Ok((_, forecast)) => info!(
                "Fetched current conditions and {} forecast samples in {:.3}s",
                forecast.len(),
                start_time.elapsed().as_secs_f64()
            ),
            Err(e) => warn!("Weather fetch failed: {}", e),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FarmcastError;
    use crate::models::GeoCandidate;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubSource {
        current_fails: bool,
        forecast_fails: bool,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn new(current_fails: bool, forecast_fails: bool) -> Self {
            Self {
                current_fails,
                forecast_fails,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl WeatherSource for StubSource {
        async fn geocode(&self, _: &str, _: u32) -> Result<Vec<GeoCandidate>> {
            unreachable!()
        }

        async fn reverse_geocode(&self, _: Coordinates, _: u32) -> Result<Vec<GeoCandidate>> {
            unreachable!()
        }

        async fn current_conditions(&self, location: &LocationQuery) -> Result<CurrentConditions> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(matches!(location, LocationQuery::Coordinates(_)));
            if self.current_fails {
                return Err(FarmcastError::upstream("city not found"));
            }
            Ok(CurrentConditions {
                location_name: "Pune".to_string(),
                condition_main: "Clouds".to_string(),
                condition_id: 803,
                description: "broken clouds".to_string(),
                temperature_c: 27.0,
                feels_like_c: 28.0,
                humidity_pct: 60.0,
                wind_speed_ms: 2.0,
                pressure_hpa: 1010.0,
            })
        }

        async fn forecast(&self, _: &LocationQuery) -> Result<RawForecast> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.forecast_fails {
                return Err(FarmcastError::upstream("Failed to fetch forecast data"));
            }
            Ok(RawForecast::default())
        }
    }

    #[tokio::test]
    async fn test_both_succeed() {
        let source = StubSource::new(false, false);
        let (current, forecast) = WeatherFetcher::fetch(&source, Coordinates::new(18.5, 73.8))
            .await
            .unwrap();
        assert_eq!(current.location_name, "Pune");
        assert!(forecast.is_empty());
    }

    #[tokio::test]
    async fn test_current_failure_fails_fetch() {
        let source = StubSource::new(true, false);
        let err = WeatherFetcher::fetch(&source, Coordinates::new(18.5, 73.8))
            .await
            .unwrap_err();
        assert!(matches!(err, FarmcastError::Upstream { ref message } if message == "city not found"));
    }

    #[tokio::test]
    async fn test_forecast_failure_discards_current() {
        let source = StubSource::new(false, true);
        let err = WeatherFetcher::fetch(&source, Coordinates::new(18.5, 73.8))
            .await
            .unwrap_err();
        assert!(matches!(err, FarmcastError::Upstream { .. }));
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}
