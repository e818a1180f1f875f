use chrono::NaiveDate;

use crate::{
    daemon::storage::entities::{DayBucket, TopSite},
    utils::{
        percentage::{productive_percentage, Percentage},
        time::{rounded_minutes, sum_seconds},
    },
};

use super::ranking::{merge_sites, top_sites};

pub const DASHBOARD_TOP_SITES: usize = 10;

/// One bar of the per day chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRow {
    pub date: NaiveDate,
    pub productive_minutes: u64,
    pub unproductive_minutes: u64,
    pub total_seconds: u64,
    pub productivity: Percentage,
}

/// Everything the dashboard shows for a range of days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    pub productive_seconds: u64,
    pub unproductive_seconds: u64,
    /// Zero when nothing was tracked.
    pub productive_share: Percentage,
    pub unproductive_share: Percentage,
    /// Tracked time per day with data.
    pub daily_average_seconds: u64,
    pub days: Vec<DayRow>,
    pub top_sites: Vec<TopSite>,
}

impl DashboardSummary {
    /// `None` for an empty range, which surfaces render as their empty state.
    pub fn from_range(days: &[(NaiveDate, DayBucket)]) -> Option<Self> {
        if days.is_empty() {
            return None;
        }

        let productive_seconds = sum_seconds(days.iter().map(|(_, d)| d.productive_seconds));
        let unproductive_seconds = sum_seconds(days.iter().map(|(_, d)| d.unproductive_seconds));
        let productive_share =
            productive_percentage(productive_seconds, unproductive_seconds).unwrap_or_default();

        let rows = days
            .iter()
            .map(|(date, day)| DayRow {
                date: *date,
                productive_minutes: rounded_minutes(day.productive_seconds),
                unproductive_minutes: rounded_minutes(day.unproductive_seconds),
                total_seconds: day.total_seconds(),
                productivity: productive_percentage(
                    day.productive_seconds,
                    day.unproductive_seconds,
                )
                .unwrap_or_default(),
            })
            .collect();

        let total = productive_seconds.saturating_add(unproductive_seconds);
        let day_count = days.len() as u64;

        Some(Self {
            productive_seconds,
            unproductive_seconds,
            productive_share,
            unproductive_share: productive_share.complement(),
            daily_average_seconds: total / day_count + u64::from(total % day_count * 2 >= day_count),
            days: rows,
            top_sites: top_sites(
                merge_sites(days.iter().map(|(_, day)| day)),
                DASHBOARD_TOP_SITES,
            ),
        })
    }
}
