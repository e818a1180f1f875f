//! The attribution tracker: one open window at a time, every boundary event credits the time
//! since it opened to its hostname.
//!
//! Idle handling is deliberately coarse. Time is dropped only when the tracker is idle at the
//! moment a window closes; going idle and coming back inside one window credits the whole window,
//! idle part included.

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, error, info, trace};
use url::Url;

use crate::{
    daemon::{
        protocol::{IdleState, TabId},
        storage::{
            entities::DayBucket,
            repository::{credit_site, load_productive_sites},
            store::KeyValueStore,
        },
        surface::Indicator,
    },
    report::indicator::Badge,
    utils::{clock::Clock, time::elapsed_seconds},
};

/// Visits shorter than this are accidental tab switches, not time spent.
pub const MIN_RECORDED_SECONDS: i64 = 5;

/// The hostname currently being credited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributionWindow {
    pub hostname: String,
    pub tab_id: TabId,
    /// `None` while the browser window is unfocused. The hostname is kept so focus can resume it.
    pub start: Option<DateTime<Utc>>,
}

pub fn resolve_hostname(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    url.host_str()
        .filter(|host| !host.is_empty())
        .map(str::to_owned)
}

pub struct AttributionTracker<S> {
    store: S,
    indicator: Box<dyn Indicator>,
    clock: Box<dyn Clock>,
    window: Option<AttributionWindow>,
    idle: bool,
}

impl<S: KeyValueStore> AttributionTracker<S> {
    pub fn new(store: S, indicator: Box<dyn Indicator>, clock: Box<dyn Clock>) -> Self {
        Self {
            store,
            indicator,
            clock,
            window: None,
            idle: false,
        }
    }

    pub fn window(&self) -> Option<&AttributionWindow> {
        self.window.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.idle
    }

    /// A tab became the active one. Tabs without a known URL are ignored altogether.
    pub async fn on_tab_activated(&mut self, tab_id: TabId, url: Option<&str>) {
        match url {
            Some(url) => self.switch_to(tab_id, url).await,
            None => debug!("Tab {tab_id} has no url yet, ignoring activation"),
        }
    }

    /// The active tab navigated to `url`.
    pub async fn on_tab_url_changed(&mut self, tab_id: TabId, url: &str) {
        self.switch_to(tab_id, url).await;
    }

    pub async fn on_window_focus_lost(&mut self) {
        let now = self.clock.time();
        self.close_window(now).await;
        if let Some(window) = self.window.as_mut() {
            debug!("Pausing {}", window.hostname);
            window.start = None;
        }
    }

    /// Resumes the remembered window. The paused span is never credited.
    pub fn on_window_focus_gained(&mut self) {
        let now = self.clock.time();
        if let Some(window) = self.window.as_mut() {
            debug!("Resuming {}", window.hostname);
            window.start = Some(now);
        }
    }

    pub fn on_idle_state_changed(&mut self, state: IdleState) {
        let idle = state.is_idle();
        if idle != self.idle {
            info!("Idle state changed to {state:?}");
        }
        self.idle = idle;
    }

    /// Credits the open window one last time before the host goes away.
    pub async fn shutdown(&mut self) {
        let now = self.clock.time();
        self.close_window(now).await;
        self.window = None;
    }

    async fn switch_to(&mut self, tab_id: TabId, url: &str) {
        let now = self.clock.time();
        self.close_window(now).await;

        self.window = match resolve_hostname(url) {
            Some(hostname) => {
                debug!("Attributing time to {hostname}");
                Some(AttributionWindow {
                    hostname,
                    tab_id,
                    start: Some(now),
                })
            }
            None => {
                debug!("Tab {tab_id} shows {url:?}, which has no hostname");
                None
            }
        };
    }

    /// Credits the running window up to `end`. Failures are logged, the interval is lost.
    async fn close_window(&mut self, end: DateTime<Utc>) {
        let Some(AttributionWindow {
            hostname,
            start: Some(start),
            ..
        }) = self.window.as_ref()
        else {
            return;
        };
        if self.idle {
            debug!("Idle, dropping time on {hostname}");
            return;
        }

        if let Err(e) = self.flush(hostname, *start, end).await {
            error!("Failed to record time on {hostname}: {e:?}");
        }
    }

    /// Adds the rounded seconds between `start` and `end` to today's bucket and refreshes the
    /// badge. Returns the updated bucket, or `None` when the visit was too short to count.
    pub async fn flush(
        &self,
        hostname: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<DayBucket>> {
        let elapsed = elapsed_seconds(start, end);
        if elapsed < MIN_RECORDED_SECONDS {
            trace!("Skipping {elapsed}s on {hostname}");
            return Ok(None);
        }

        let category = load_productive_sites(&self.store)
            .await
            .classify(hostname);
        let bucket = credit_site(
            &self.store,
            end.date_naive(),
            hostname,
            category,
            elapsed as u64,
        )
        .await?;
        debug!("Recorded {elapsed}s on {hostname} as {category:?}");

        self.indicator.set_badge(&Badge::for_bucket(&bucket));
        Ok(Some(bucket))
    }
}
