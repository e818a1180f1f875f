use chrono::NaiveDate;

use crate::{
    daemon::storage::entities::{TimeData, WeeklyReportSnapshot},
    utils::{
        percentage::productive_percentage,
        time::{format_seconds, sum_seconds},
    },
};

use super::{
    range::{range_query, RangeSelector},
    ranking::{merge_sites, top_sites},
};

pub const WEEKLY_DAYS: u32 = 7;
pub const WEEKLY_TOP_SITES: usize = 5;

pub const WEEKLY_TITLE: &str = "Weekly Productivity Report";
pub const WEEKLY_CONTEXT: &str = "Click to view details in dashboard";

/// Totals and top sites of the trailing week (`today - 7` and later).
pub fn weekly_rollup(data: &TimeData, today: NaiveDate) -> WeeklyReportSnapshot {
    let days = range_query(data, RangeSelector::Days(WEEKLY_DAYS), today);

    let productive_seconds = sum_seconds(days.iter().map(|(_, day)| day.productive_seconds));
    let unproductive_seconds = sum_seconds(days.iter().map(|(_, day)| day.unproductive_seconds));
    let merged = merge_sites(days.iter().map(|(_, day)| day));

    WeeklyReportSnapshot {
        productive_seconds,
        unproductive_seconds,
        top_sites: top_sites(merged, WEEKLY_TOP_SITES),
    }
}

/// Body of the weekly notification.
pub fn weekly_message(report: &WeeklyReportSnapshot) -> String {
    let percentage =
        productive_percentage(report.productive_seconds, report.unproductive_seconds)
            .unwrap_or_default();
    format!(
        "You spent {} on productive sites ({percentage}) and {} on unproductive sites.",
        format_seconds(report.productive_seconds),
        format_seconds(report.unproductive_seconds),
    )
}
