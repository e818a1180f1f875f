use std::time::Duration;

use anyhow::Result;
use tokio::{select, sync::mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{daemon::protocol::HostEvent, utils::clock::Clock};

pub const WEEK: Duration = Duration::from_secs(60 * 60 * 24 * 7);

/// Periodic trigger for the weekly report. Fires every `period`, the first time one period after
/// start, whatever the tracker is doing.
pub struct WeeklyAlarm {
    next: mpsc::Sender<HostEvent>,
    period: Duration,
    shutdown: CancellationToken,
    clock: Box<dyn Clock>,
}

impl WeeklyAlarm {
    pub fn new(
        next: mpsc::Sender<HostEvent>,
        period: Duration,
        shutdown: CancellationToken,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            next,
            period,
            shutdown,
            clock,
        }
    }

    pub async fn run(self) -> Result<()> {
        let mut fire_at = self.clock.instant();
        loop {
            fire_at += self.period;

            select! {
                // Cancelation drops the sender, which lets processing finish once the reader is
                // gone too.
                _ = self.shutdown.cancelled() => {
                    return Ok(())
                }
                _ = self.clock.sleep_until(fire_at) => ()
            }

            info!("Weekly alarm fired");
            if self.next.send(HostEvent::WeeklyAlarm).await.is_err() {
                debug!("Processing stopped, alarm is no longer needed");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::utils::clock::ManualClock;

    #[tokio::test(start_paused = true)]
    async fn test_alarm_fires_every_period() -> Result<()> {
        let (sender, mut receiver) = mpsc::channel(4);
        let shutdown = CancellationToken::new();
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let alarm = WeeklyAlarm::new(sender, WEEK, shutdown.clone(), Box::new(clock));

        let (result, fired) = tokio::join!(alarm.run(), async {
            let start = tokio::time::Instant::now();
            let first = receiver.recv().await;
            let first_at = start.elapsed();
            let second = receiver.recv().await;
            let second_at = start.elapsed();
            shutdown.cancel();
            (first, first_at, second, second_at)
        });
        result?;

        let (first, first_at, second, second_at) = fired;
        assert_eq!(first, Some(HostEvent::WeeklyAlarm));
        assert_eq!(second, Some(HostEvent::WeeklyAlarm));
        assert!(first_at >= WEEK);
        assert!(second_at >= WEEK * 2);
        Ok(())
    }
}
