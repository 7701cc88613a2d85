//! Time-of-day greeting, refreshed on a fixed interval

use crate::config::GreetingConfig;
use chrono::{Local, Timelike};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayPeriod {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl DayPeriod {
    /// Classify an hour of the day (0-23)
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => DayPeriod::Morning,
            12..=16 => DayPeriod::Afternoon,
            17..=20 => DayPeriod::Evening,
            _ => DayPeriod::Night,
        }
    }

    pub fn now() -> Self {
        Self::from_hour(Local::now().hour())
    }

    pub fn greeting(&self) -> &'static str {
        match self {
            DayPeriod::Morning => "Good morning",
            DayPeriod::Afternoon => "Good afternoon",
            DayPeriod::Evening => "Good evening",
            DayPeriod::Night => "Good night",
        }
    }
}

/// Background task that republishes the current `DayPeriod`
pub struct GreetingClock {
    receiver: watch::Receiver<DayPeriod>,
    handle: JoinHandle<()>,
}

impl GreetingClock {
    /// Spawn the refresh loop on the current tokio runtime
    #[must_use = "dropping the clock stops the refresh task"]
    pub fn spawn(interval: Duration) -> Self {
        Self::spawn_with(interval, DayPeriod::now)
    }

    #[must_use = "dropping the clock stops the refresh task"]
    pub fn from_config(config: &GreetingConfig) -> Self {
        Self::spawn(Duration::from_secs(config.refresh_seconds.max(1)))
    }

    /// Like `spawn`, with a custom period source
    #[must_use = "dropping the clock stops the refresh task"]
    pub fn spawn_with<F>(interval: Duration, mut period: F) -> Self
    where
        F: FnMut() -> DayPeriod + Send + 'static,
    {
        let (sender, receiver) = watch::channel(period());
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // the first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let current = period();
                let changed = sender.send_if_modified(|previous| {
                    let changed = *previous != current;
                    *previous = current;
                    changed
                });
                if changed {
                    debug!("Day period changed to {:?}", current);
                }
                if sender.is_closed() {
                    break;
                }
            }
        });

        Self { receiver, handle }
    }

    pub fn current(&self) -> DayPeriod {
        *self.receiver.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<DayPeriod> {
        self.receiver.clone()
    }
}

impl Drop for GreetingClock {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[rstest]
    #[case(0, DayPeriod::Night)]
    #[case(4, DayPeriod::Night)]
    #[case(5, DayPeriod::Morning)]
    #[case(11, DayPeriod::Morning)]
    #[case(12, DayPeriod::Afternoon)]
    #[case(16, DayPeriod::Afternoon)]
    #[case(17, DayPeriod::Evening)]
    #[case(20, DayPeriod::Evening)]
    #[case(21, DayPeriod::Night)]
    #[case(23, DayPeriod::Night)]
    fn test_from_hour(#[case] hour: u32, #[case] expected: DayPeriod) {
        assert_eq!(DayPeriod::from_hour(hour), expected);
    }

    #[test]
    fn test_greeting_text() {
        assert_eq!(DayPeriod::Morning.greeting(), "Good morning");
        assert_eq!(DayPeriod::Night.greeting(), "Good night");
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_refreshes_on_interval() {
        let hour = Arc::new(AtomicU32::new(11));
        let clock = GreetingClock::spawn_with(Duration::from_secs(60), {
            let hour = Arc::clone(&hour);
            move || DayPeriod::from_hour(hour.load(Ordering::SeqCst))
        });
        let mut updates = clock.subscribe();

        assert_eq!(clock.current(), DayPeriod::Morning);

        hour.store(12, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(clock.current(), DayPeriod::Morning);

        updates.changed().await.unwrap();
        assert_eq!(*updates.borrow(), DayPeriod::Afternoon);
    }
}
