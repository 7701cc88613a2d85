//! Interactive query session with stale-response protection
//!
//! Every submitted query takes the next sequence number. When a query
//! finishes after a newer one was issued, its result is discarded instead of
//! overwriting fresher state.

use crate::pipeline::WeatherQueryPipeline;
use crate::models::{LocationQuery, WeatherReport};
use crate::FarmcastError;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{debug, info};

/// What a view layer renders
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Loading { sequence: u64 },
    Ready { sequence: u64, report: Box<WeatherReport> },
    Failed { sequence: u64, message: String },
}

/// Result of one submitted query
#[derive(Debug)]
pub enum QueryOutcome {
    Completed(Box<WeatherReport>),
    Failed(FarmcastError),
    /// A newer query was issued before this one finished
    Superseded { sequence: u64 },
}

/// Issues sequence numbers and keeps the latest state
pub struct QuerySession {
    pipeline: WeatherQueryPipeline,
    latest: AtomicU64,
    state: watch::Sender<SessionState>,
}

impl QuerySession {
    pub fn new(pipeline: WeatherQueryPipeline) -> Arc<Self> {
        let (state, _) = watch::channel(SessionState::Idle);
        Arc::new(Self {
            pipeline,
            latest: AtomicU64::new(0),
            state,
        })
    }

    /// Observe state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Sequence number of the most recently issued query, 0 before any
    pub fn latest_sequence(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    fn is_latest(&self, sequence: u64) -> bool {
        self.latest_sequence() == sequence
    }

    /// Run a query. Empty name queries are rejected locally without taking
    /// a sequence number or touching state.
    pub async fn submit(&self, query: LocationQuery) -> QueryOutcome {
        if query.is_empty() {
            debug!("Ignoring empty query");
            return QueryOutcome::Failed(FarmcastError::EmptyQuery);
        }

        // sequence allocation and the Loading publish share the channel lock
        let mut sequence = 0;
        self.state.send_modify(|state| {
            sequence = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
            *state = SessionState::Loading { sequence };
        });
        debug!("Query #{} started: {}", sequence, query);

        let result = self.pipeline.fetch_report(&query).await;

        let (next, outcome) = match result {
            Ok(report) => {
                let report = Box::new(report);
                (
                    SessionState::Ready {
                        sequence,
                        report: report.clone(),
                    },
                    QueryOutcome::Completed(report),
                )
            }
            Err(e) => (
                SessionState::Failed {
                    sequence,
                    message: e.user_message(),
                },
                QueryOutcome::Failed(e),
            ),
        };

        let published = self.state.send_if_modified(|state| {
            if !self.is_latest(sequence) {
                return false;
            }
            *state = next;
            true
        });

        if !published {
            info!(
                "Discarding result of query #{}, superseded by #{}",
                sequence,
                self.latest_sequence()
            );
            return QueryOutcome::Superseded { sequence };
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::WeatherSource;
    use crate::forecast::ForecastNormalizer;
    use crate::models::{Coordinates, CurrentConditions, GeoCandidate, RawForecast};
    use crate::Result;
    use async_trait::async_trait;
    use std::time::Duration;

    /// Geocodes "Slowtown" (5s) and "Hangtown" (10s) slowly, everything
    /// else immediately
    struct DelayedSource;

    #[async_trait]
    impl WeatherSource for DelayedSource {
        async fn geocode(&self, query: &str, _: u32) -> Result<Vec<GeoCandidate>> {
            match query {
                "Slowtown" => tokio::time::sleep(Duration::from_secs(5)).await,
                "Hangtown" => tokio::time::sleep(Duration::from_secs(10)).await,
                _ => {}
            }
            if query == "Nowhere" {
                return Ok(Vec::new());
            }
            Ok(vec![GeoCandidate {
                name: query.to_string(),
                state: None,
                country: "IN".to_string(),
                latitude: 10.0,
                longitude: 20.0,
            }])
        }

        async fn reverse_geocode(&self, _: Coordinates, _: u32) -> Result<Vec<GeoCandidate>> {
            Ok(Vec::new())
        }

        async fn current_conditions(&self, _: &LocationQuery) -> Result<CurrentConditions> {
            Ok(CurrentConditions {
                location_name: "Somewhere".to_string(),
                condition_main: "Clouds".to_string(),
                condition_id: 802,
                description: "scattered clouds".to_string(),
                temperature_c: 22.0,
                feels_like_c: 22.0,
                humidity_pct: 60.0,
                wind_speed_ms: 2.0,
                pressure_hpa: 1012.0,
            })
        }

        async fn forecast(&self, _: &LocationQuery) -> Result<RawForecast> {
            Ok(RawForecast::default())
        }
    }

    fn session() -> Arc<QuerySession> {
        QuerySession::new(WeatherQueryPipeline::new(
            Arc::new(DelayedSource),
            ForecastNormalizer::default(),
            true,
        ))
    }

    fn name(text: &str) -> LocationQuery {
        LocationQuery::Name(text.to_string())
    }

    #[tokio::test]
    async fn test_successful_query_updates_state() {
        let session = session();
        let outcome = session.submit(name("Pune")).await;

        assert!(matches!(outcome, QueryOutcome::Completed(_)));
        match session.state() {
            SessionState::Ready { sequence, report } => {
                assert_eq!(sequence, 1);
                assert_eq!(report.location.display_name, "Pune, IN");
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failed_query_publishes_message() {
        let session = session();
        let outcome = session.submit(name("Nowhere")).await;

        assert!(matches!(
            outcome,
            QueryOutcome::Failed(FarmcastError::LocationNotFound { .. })
        ));
        assert!(matches!(
            session.state(),
            SessionState::Failed { sequence: 1, ref message } if message.contains("Nowhere")
        ));
    }

    #[tokio::test]
    async fn test_empty_query_is_suppressed() {
        let session = session();
        let outcome = session.submit(name("  ")).await;

        assert!(matches!(outcome, QueryOutcome::Failed(FarmcastError::EmptyQuery)));
        assert_eq!(session.latest_sequence(), 0);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_is_discarded() {
        let session = session();

        let slow = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.submit(name("Slowtown")).await }
        });
        // let the slow query take its sequence number first
        tokio::task::yield_now().await;
        while session.latest_sequence() == 0 {
            tokio::task::yield_now().await;
        }

        let fast = session.submit(name("Pune")).await;
        assert!(matches!(fast, QueryOutcome::Completed(_)));

        let slow = slow.await.unwrap();
        assert!(matches!(slow, QueryOutcome::Superseded { sequence: 1 }));

        match session.state() {
            SessionState::Ready { sequence, report } => {
                assert_eq!(sequence, 2);
                assert_eq!(report.location.display_name, "Pune, IN");
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_result_keeps_newer_loading_state() {
        let session = session();

        let slow = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.submit(name("Slowtown")).await }
        });
        while session.latest_sequence() < 1 {
            tokio::task::yield_now().await;
        }

        let slower = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.submit(name("Hangtown")).await }
        });
        while session.latest_sequence() < 2 {
            tokio::task::yield_now().await;
        }

        // the first query finishes while the second is still loading
        let slow = slow.await.unwrap();
        assert!(matches!(slow, QueryOutcome::Superseded { sequence: 1 }));
        assert_eq!(session.state(), SessionState::Loading { sequence: 2 });

        let slower = slower.await.unwrap();
        assert!(matches!(slower, QueryOutcome::Completed(_)));
        assert!(matches!(session.state(), SessionState::Ready { sequence: 2, .. }));
    }
}
