//! Forecast normalization: sub-daily samples down to one sample per day

use crate::models::{ForecastSample, ForecastSeries, RawForecast};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;

/// Upper bound on the number of days in a normalized series
pub const MAX_FORECAST_DAYS: usize = 7;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// How one sample per day is picked from the raw list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SamplingPolicy {
    /// Every `stride`-th sample from index 0. `None` derives the stride
    /// from the forecast's sampling interval.
    Stride { stride: Option<usize> },
    /// Samples whose UTC time of day equals `marker`
    TimeOfDay { marker: NaiveTime },
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        SamplingPolicy::Stride { stride: None }
    }
}

/// Samples per day for a given source interval, at least 1
pub fn stride_for_interval(interval: Duration) -> usize {
    let seconds = interval.as_secs();
    if seconds == 0 {
        return 1;
    }
    usize::try_from(SECONDS_PER_DAY / seconds).unwrap_or(1).max(1)
}

/// Reduces a raw forecast to a `ForecastSeries`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastNormalizer {
    policy: SamplingPolicy,
    max_days: usize,
}

impl Default for ForecastNormalizer {
    fn default() -> Self {
        Self::new(SamplingPolicy::default(), MAX_FORECAST_DAYS)
    }
}

impl ForecastNormalizer {
    /// `max_days` is clamped to `1..=MAX_FORECAST_DAYS`
    pub fn new(policy: SamplingPolicy, max_days: usize) -> Self {
        Self {
            policy,
            max_days: max_days.clamp(1, MAX_FORECAST_DAYS),
        }
    }

    /// Pick at most `max_days` samples, one per calendar day, in input order.
    /// A non-empty input always yields at least its first sample.
    pub fn normalize(&self, raw: &RawForecast) -> ForecastSeries {
        let Some(first) = raw.samples.first() else {
            return ForecastSeries::default();
        };

        let selected: Vec<&ForecastSample> = match self.policy {
            SamplingPolicy::Stride { stride } => {
                let stride = stride
                    .or_else(|| raw.interval().map(stride_for_interval))
                    .unwrap_or(1)
                    .max(1);
                raw.samples.iter().step_by(stride).collect()
            }
            SamplingPolicy::TimeOfDay { marker } => raw
                .samples
                .iter()
                .filter(|sample| sample.timestamp.time() == marker)
                .collect(),
        };

        let mut seen: HashSet<NaiveDate> = HashSet::new();
        let mut days: Vec<ForecastSample> = selected
            .into_iter()
            .filter(|sample| seen.insert(sample.day()))
            .take(self.max_days)
            .cloned()
            .collect();

        if days.is_empty() {
            debug!("No sample matched {:?}, falling back to the first", self.policy);
            days.push(first.clone());
        }

        debug!(
            "Normalized {} raw samples to {} days",
            raw.len(),
            days.len()
        );

        ForecastSeries { days }
    }
}
