//! The weather query pipeline: resolve, fetch, normalize, advise

use crate::advisory::AdvisoryReport;
use crate::api::{WeatherApiClient, WeatherSource};
use crate::config::FarmcastConfig;
use crate::forecast::ForecastNormalizer;
use crate::geolocation::GeolocationProvider;
use crate::location_resolver::LocationResolver;
use crate::models::{LocationQuery, WeatherReport};
use crate::weather::WeatherFetcher;
use crate::Result;
use std::sync::Arc;
use tracing::{info, instrument};

/// Runs one query from location text (or position) to a `WeatherReport`
#[derive(Clone)]
pub struct WeatherQueryPipeline {
    source: Arc<dyn WeatherSource>,
    normalizer: ForecastNormalizer,
    advisories: bool,
}

impl WeatherQueryPipeline {
    pub fn new(source: Arc<dyn WeatherSource>, normalizer: ForecastNormalizer, advisories: bool) -> Self {
        Self {
            source,
            normalizer,
            advisories,
        }
    }

    /// Build a pipeline backed by the OpenWeatherMap client
    pub fn from_config(config: &FarmcastConfig) -> Result<Self> {
        let client = WeatherApiClient::new(&config.weather)?;
        let normalizer = ForecastNormalizer::new(
            config.forecast.sampling_policy()?,
            config.forecast.max_days,
        );
        Ok(Self::new(Arc::new(client), normalizer, config.advisory.enabled))
    }

    /// The weather source, shared with auxiliary lookups
    pub fn source(&self) -> Arc<dyn WeatherSource> {
        Arc::clone(&self.source)
    }

    /// Resolve the query, fetch both payloads for the resolved position,
    /// normalize the forecast and derive advisories. Any failure discards
    /// everything fetched so far.
    #[instrument(skip(self, query), fields(query = %query))]
    pub async fn fetch_report(&self, query: &LocationQuery) -> Result<WeatherReport> {
        let location = LocationResolver::resolve_location(self.source.as_ref(), query).await?;
        let (current, raw_forecast) =
            WeatherFetcher::fetch(self.source.as_ref(), location.coordinates()).await?;

        let forecast = self.normalizer.normalize(&raw_forecast);
        let advisory = self
            .advisories
            .then(|| AdvisoryReport::derive(&current));

        info!(
            "Report ready for '{}': {} forecast days",
            location.display_name,
            forecast.len()
        );

        Ok(WeatherReport {
            location,
            current,
            forecast,
            advisory,
        })
    }

    /// Same as `fetch_report`, starting from the device position
    pub async fn fetch_report_for_device(
        &self,
        provider: &dyn GeolocationProvider,
    ) -> Result<WeatherReport> {
        let coordinates = provider.current_position().await?;
        self.fetch_report(&LocationQuery::Coordinates(coordinates))
            .await
    }
}
