use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Result;
use collection::{alarm::WeeklyAlarm, reader::EventReader};
use processing::{
    router::EventRouter, tracker::AttributionTracker, weekly::WeeklyReporter, ProcessingModule,
};
use protocol::{HostEvent, HostMessage};
use storage::{file_store::open_areas, repository::initialize_defaults, store::KeyValueStore};
use surface::{ChangeForwarder, HostChannel, HostWriter};
use tokio::{
    io::{AsyncBufRead, AsyncWrite, BufReader},
    sync::mpsc,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::utils::clock::{Clock, DefaultClock};

pub mod args;
pub mod collection;
pub mod processing;
pub mod protocol;
pub mod shutdown;
pub mod storage;
pub mod surface;

const EVENT_QUEUE_CAPACITY: usize = 64;
pub const DEFAULT_IDLE_DETECTION_SECONDS: u32 = 30;

#[derive(Debug, Clone, Copy)]
pub struct HostConfig {
    pub weekly_interval: Duration,
    /// Asked of the extension once at start: how long without input counts as idle.
    pub idle_detection_seconds: u32,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            weekly_interval: collection::alarm::WEEK,
            idle_detection_seconds: DEFAULT_IDLE_DETECTION_SECONDS,
        }
    }
}

/// Represents the starting point for the host. Talks to the extension over stdin and stdout until
/// either is closed or the process is interrupted.
pub async fn start_daemon(dir: PathBuf, config: HostConfig) -> Result<()> {
    let (sync, local) = open_areas(&dir)?;
    info!("Using storage at {:?} and {:?}", sync.path(), local.path());

    let shutdown_token = CancellationToken::new();

    let (_, host_result) = tokio::join!(
        shutdown::detect_shutdown(shutdown_token.clone()),
        run_host(
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
            Arc::new(sync),
            Arc::new(local),
            config,
            DefaultClock,
            shutdown_token.clone(),
        ),
    );

    host_result
}

/// Runs every part of the host until `input` ends or `shutdown` is cancelled. All events go
/// through a single queue so that transitions never overlap.
pub async fn run_host<R, W, S, L>(
    input: R,
    output: W,
    sync: S,
    local: L,
    config: HostConfig,
    clock: impl Clock + Clone,
    shutdown: CancellationToken,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    S: KeyValueStore + Clone,
    L: KeyValueStore,
{
    if let Err(e) = initialize_defaults(&sync).await {
        error!("Failed to initialize settings {e:?}");
    }

    let (channel, outgoing) = HostChannel::new();
    channel.send(HostMessage::SetIdleDetectionInterval {
        seconds: config.idle_detection_seconds,
    })?;

    let (sender, receiver) = mpsc::channel::<HostEvent>(EVENT_QUEUE_CAPACITY);

    let reader = EventReader::new(input, sender.clone(), shutdown.clone());
    let alarm = WeeklyAlarm::new(
        sender,
        config.weekly_interval,
        shutdown.clone(),
        Box::new(clock.clone()),
    );
    let forwarder = ChangeForwarder::new(
        vec![sync.subscribe(), local.subscribe()],
        channel.clone(),
        shutdown.clone(),
    );

    let tracker = AttributionTracker::new(
        sync.clone(),
        Box::new(channel.clone()),
        Box::new(clock.clone()),
    );
    let reporter = WeeklyReporter::new(sync, local, Box::new(channel), Box::new(clock));
    let processor = ProcessingModule::new(receiver, EventRouter::new(tracker, reporter));

    let writer = HostWriter::new(output, outgoing);

    let (reader_result, alarm_result, forwarder_result, processing_result, writer_result) = tokio::join!(
        reader.run(),
        alarm.run(),
        forwarder.run(),
        processor.run(),
        writer.run(),
    );

    for (name, result) in [
        ("Reader", reader_result),
        ("Alarm", alarm_result),
        ("Forwarder", forwarder_result),
        ("Processing", processing_result),
        ("Writer", writer_result),
    ] {
        if let Err(e) = result {
            error!("{name} module got an error {e:?}");
        }
    }

    info!("Host stopped");
    Ok(())
}

#[cfg(test)]
mod daemon_tests {
    use std::{sync::Arc, time::Duration};

    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
    use serde_json::Value;
    use tokio::{
        io::{AsyncWriteExt, BufReader},
        time::Instant,
    };
    use tokio_util::sync::CancellationToken;

    use super::{run_host, HostConfig};
    use crate::{
        daemon::storage::{
            entities::Category,
            memory_store::MemoryStore,
            repository::{load_day, load_productive_sites},
            store::StoreArea,
        },
        sites::SiteList,
        utils::{clock::Clock, logging::TEST_LOGGING},
    };

    const TEST_START_DATE: NaiveDateTime =
        NaiveDateTime::new(NaiveDate::from_ymd_opt(2018, 7, 4).unwrap(), NaiveTime::MIN);

    #[derive(Clone)]
    struct TestClock {
        start_time: DateTime<Utc>,
        reference: Instant,
    }

    #[async_trait]
    impl Clock for TestClock {
        fn time(&self) -> DateTime<Utc> {
            self.start_time + self.reference.elapsed()
        }

        fn instant(&self) -> Instant {
            Instant::now()
        }

        async fn sleep_until(&self, instant: Instant) {
            tokio::time::sleep_until(instant).await;
        }
    }

    fn event(line: &str) -> Vec<u8> {
        format!("{line}\n").into_bytes()
    }

    /// Drives the host like a browser would: two sites, a focus loss, then the extension goes
    /// away.
    #[tokio::test(start_paused = true)]
    async fn smoke_test_daemon() -> Result<()> {
        *TEST_LOGGING;
        let sync = Arc::new(MemoryStore::new(StoreArea::Sync));
        let local = Arc::new(MemoryStore::new(StoreArea::Local));
        let test_clock = TestClock {
            start_time: Utc.from_utc_datetime(&TEST_START_DATE),
            reference: Instant::now(),
        };
        let (mut client, host_input) = tokio::io::duplex(4096);
        let mut output = Vec::<u8>::new();

        let (host_result, client_result) = tokio::join!(
            run_host(
                BufReader::new(host_input),
                &mut output,
                sync.clone(),
                local.clone(),
                HostConfig::default(),
                test_clock,
                CancellationToken::new(),
            ),
            async {
                client
                    .write_all(&event(
                        r#"{"type":"tabActivated","tabId":1,"url":"https://github.com/rust-lang"}"#,
                    ))
                    .await?;
                tokio::time::sleep(Duration::from_secs(30)).await;
                client
                    .write_all(&event(
                        r#"{"type":"tabActivated","tabId":2,"url":"https://news.ycombinator.com/"}"#,
                    ))
                    .await?;
                tokio::time::sleep(Duration::from_secs(10)).await;
                client
                    .write_all(&event(r#"{"type":"windowFocusChanged","focused":false}"#))
                    .await?;
                tokio::time::sleep(Duration::from_secs(600)).await;
                drop(client);
                anyhow::Ok(())
            }
        );
        host_result?;
        client_result?;

        let bucket = load_day(&sync, TEST_START_DATE.date()).await;
        assert_eq!(bucket.sites["github.com"].seconds, 30);
        assert_eq!(bucket.sites["github.com"].category, Category::Productive);
        assert_eq!(bucket.sites["news.ycombinator.com"].seconds, 10);
        assert_eq!(
            bucket.sites["news.ycombinator.com"].category,
            Category::Unproductive
        );
        assert_eq!(load_productive_sites(&sync).await, SiteList::default());

        let messages = String::from_utf8(output)?
            .lines()
            .map(serde_json::from_str::<Value>)
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(messages[0]["type"], "setIdleDetectionInterval");
        assert_eq!(messages[0]["seconds"], 30);

        let badges = messages
            .iter()
            .filter(|m| m["type"] == "setBadge")
            .map(|m| m["text"].as_str().unwrap_or_default())
            .collect::<Vec<_>>();
        assert_eq!(badges, vec!["100%", "75%"]);
        assert!(messages
            .iter()
            .any(|m| m["type"] == "storageChanged" && m["area"] == "sync"));
        Ok(())
    }
}
