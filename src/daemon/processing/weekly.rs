use anyhow::Result;
use tracing::{info, warn};

use crate::{
    daemon::{
        protocol::Notification,
        storage::{
            entities::WeeklyReportSnapshot,
            repository::{load_time_data, save_weekly_report},
            store::KeyValueStore,
        },
        surface::Notifier,
    },
    report::weekly::{weekly_message, weekly_rollup, WEEKLY_CONTEXT, WEEKLY_TITLE},
    utils::clock::Clock,
};

/// What asked for a report. Only the periodic alarm tells the user about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Periodic,
    OnDemand,
}

/// Rolls the last week of `timeData` (sync area) into the cached `weeklyReport` (local area).
pub struct WeeklyReporter<S, L> {
    sync: S,
    local: L,
    notifier: Box<dyn Notifier>,
    clock: Box<dyn Clock>,
}

impl<S: KeyValueStore, L: KeyValueStore> WeeklyReporter<S, L> {
    pub fn new(sync: S, local: L, notifier: Box<dyn Notifier>, clock: Box<dyn Clock>) -> Self {
        Self {
            sync,
            local,
            notifier,
            clock,
        }
    }

    /// Builds and stores a fresh snapshot. Nothing happens when no day was ever tracked.
    pub async fn generate(&self, trigger: Trigger) -> Result<Option<WeeklyReportSnapshot>> {
        let time_data = load_time_data(&self.sync).await;
        if time_data.is_empty() {
            info!("No tracked days, skipping weekly report");
            return Ok(None);
        }

        let report = weekly_rollup(&time_data, self.clock.today());
        save_weekly_report(&self.local, &report).await?;
        info!(
            "Weekly report saved: {}s productive, {}s unproductive",
            report.productive_seconds, report.unproductive_seconds
        );

        if trigger == Trigger::Periodic {
            let notification = Notification {
                title: WEEKLY_TITLE.into(),
                message: weekly_message(&report),
                context_message: Some(WEEKLY_CONTEXT.into()),
            };
            // The report is already stored, a lost notification doesn't undo it.
            if let Err(e) = self.notifier.notify(&notification) {
                warn!("Failed to deliver weekly notification: {e:?}");
            }
        }
        Ok(Some(report))
    }
}
