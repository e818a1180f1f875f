use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::time::Instant;

/// Source of wall-clock time and sleeping for the tracker and the weekly alarm. Swapped out in
/// tests so that attribution windows can be given exact lengths.
#[async_trait]
pub trait Clock: Sync + Send + 'static {
    fn time(&self) -> DateTime<Utc>;

    /// Calendar date used to key day buckets.
    fn today(&self) -> NaiveDate {
        self.time().date_naive()
    }

    fn instant(&self) -> Instant;

    async fn sleep_until(&self, instant: Instant);
}

#[derive(Clone, Copy, Default)]
pub struct DefaultClock;

#[async_trait]
impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&self, instant: Instant) {
        tokio::time::sleep_until(instant).await;
    }
}

#[cfg(test)]
pub use manual::ManualClock;

#[cfg(test)]
mod manual {
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Clock whose wall time only moves when told to.
    #[derive(Clone)]
    pub struct ManualClock {
        now: Arc<Mutex<DateTime<Utc>>>,
    }

    impl ManualClock {
        pub fn new(start: DateTime<Utc>) -> Self {
            Self {
                now: Arc::new(Mutex::new(start)),
            }
        }

        pub fn advance(&self, by: chrono::Duration) {
            *self.now.lock().unwrap() += by;
        }

        pub fn advance_secs(&self, seconds: i64) {
            self.advance(chrono::Duration::seconds(seconds));
        }
    }

    #[async_trait]
    impl Clock for ManualClock {
        fn time(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }

        fn instant(&self) -> Instant {
            Instant::now()
        }

        async fn sleep_until(&self, instant: Instant) {
            tokio::time::sleep_until(instant).await;
        }
    }
}
