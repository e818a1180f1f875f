use anyhow::Result;
use tracing::debug;

use crate::daemon::{
    collection::tabs::TabRegistry,
    protocol::{BrowserEvent, HostEvent},
    storage::store::KeyValueStore,
};

use super::{
    module::EventProcessor,
    tracker::AttributionTracker,
    weekly::{Trigger, WeeklyReporter},
};

/// Dispatches queued events to the tracker and the weekly reporter.
pub struct EventRouter<S, L> {
    tracker: AttributionTracker<S>,
    reporter: WeeklyReporter<S, L>,
    tabs: TabRegistry,
}

impl<S: KeyValueStore, L: KeyValueStore> EventRouter<S, L> {
    pub fn new(tracker: AttributionTracker<S>, reporter: WeeklyReporter<S, L>) -> Self {
        Self {
            tracker,
            reporter,
            tabs: TabRegistry::new(),
        }
    }

    pub fn tracker(&self) -> &AttributionTracker<S> {
        &self.tracker
    }

    async fn route(&mut self, event: BrowserEvent) -> Result<()> {
        match event {
            BrowserEvent::TabActivated { tab_id, url } => {
                if let Some(url) = &url {
                    self.tabs.remember(tab_id, url);
                }
                let url = self.tabs.url_of(tab_id).map(str::to_owned);
                self.tracker.on_tab_activated(tab_id, url.as_deref()).await;
            }
            BrowserEvent::TabUpdated {
                tab_id,
                url: Some(url),
                active,
            } => {
                self.tabs.remember(tab_id, &url);
                if active {
                    self.tracker.on_tab_url_changed(tab_id, &url).await;
                }
            }
            BrowserEvent::TabUpdated { url: None, .. } => {
                debug!("Tab update without navigation, nothing to do");
            }
            BrowserEvent::TabRemoved { tab_id } => self.tabs.forget(tab_id),
            BrowserEvent::WindowFocusChanged { focused: true } => {
                self.tracker.on_window_focus_gained()
            }
            BrowserEvent::WindowFocusChanged { focused: false } => {
                self.tracker.on_window_focus_lost().await
            }
            BrowserEvent::IdleStateChanged { state } => self.tracker.on_idle_state_changed(state),
            BrowserEvent::GenerateWeeklyReport => {
                self.reporter.generate(Trigger::OnDemand).await?;
            }
        }
        Ok(())
    }
}

impl<S: KeyValueStore, L: KeyValueStore> EventProcessor for EventRouter<S, L> {
    async fn process_next(&mut self, event: HostEvent) -> Result<()> {
        match event {
            HostEvent::Browser(event) => self.route(event).await,
            HostEvent::WeeklyAlarm => {
                self.reporter.generate(Trigger::Periodic).await?;
                Ok(())
            }
        }
    }

    async fn finalize(&mut self) -> Result<()> {
        self.tracker.shutdown().await;
        Ok(())
    }
}
