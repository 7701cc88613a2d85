//! City suggestions for partially typed input

use crate::api::WeatherSource;
use crate::config::SuggestionConfig;
use crate::models::GeoCandidate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, instrument, warn};

/// One suggestion entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySuggestion {
    /// `"Name, State"` or `"Name, Country"`, ready to be used as query text
    pub label: String,
    pub candidate: GeoCandidate,
}

impl From<GeoCandidate> for CitySuggestion {
    fn from(candidate: GeoCandidate) -> Self {
        Self {
            label: candidate.display_name(),
            candidate,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SuggestionOutcome {
    /// Input is too short to look up; any shown list should be cleared
    TooShort,
    Suggestions(Vec<CitySuggestion>),
    /// A newer lookup was started before this one finished
    Superseded,
}

/// Suggestion lookups triggered by input changes
pub struct SuggestionLookup {
    source: Arc<dyn WeatherSource>,
    min_chars: usize,
    limit: u32,
    latest: AtomicU64,
}

impl SuggestionLookup {
    pub fn new(source: Arc<dyn WeatherSource>, config: &SuggestionConfig) -> Self {
        Self {
            source,
            min_chars: config.min_chars.max(1),
            limit: config.limit.max(1),
            latest: AtomicU64::new(0),
        }
    }

    /// Look up suggestions for `input`. Lookup failures are logged and
    /// produce an empty list.
    #[instrument(skip(self))]
    pub async fn suggest(&self, input: &str) -> SuggestionOutcome {
        let sequence = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let input = input.trim();

        if input.chars().count() < self.min_chars {
            return SuggestionOutcome::TooShort;
        }

        let suggestions = match self.source.geocode(input, self.limit).await {
            Ok(candidates) => candidates.into_iter().map(CitySuggestion::from).collect(),
            Err(e) => {
                warn!("Suggestion lookup failed for '{}': {}", input, e);
                Vec::new()
            }
        };

        if self.latest.load(Ordering::SeqCst) != sequence {
            debug!("Dropping stale suggestions for '{}'", input);
            return SuggestionOutcome::Superseded;
        }

        SuggestionOutcome::Suggestions(suggestions)
    }
}
