use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use tracing::warn;

use crate::{
    daemon::{
        processing::weekly::{Trigger, WeeklyReporter},
        storage::{
            entities::{Category, TopSite, WeeklyReportSnapshot},
            repository::{load_time_data, load_weekly_report},
            store::KeyValueStore,
        },
    },
    report::{
        range::{range_query, RangeSelector},
        ranking::shorten_site_name,
        summary::DashboardSummary,
    },
    utils::{
        clock::{Clock, DefaultClock},
        percentage::productive_percentage,
        time::format_seconds,
    },
};

use super::console::{heading, ConsoleNotifier};

pub const EMPTY_STATE: &str = "No data available for the selected time range";

#[derive(Debug, Parser)]
pub struct DashboardCommand {
    #[arg(
        long,
        short,
        default_value = "7",
        allow_hyphen_values = true,
        help = "Number of past days to include, or \"all\""
    )]
    range: String,
}

#[derive(Debug, Parser)]
pub struct WeeklyCommand {
    #[arg(long, help = "Build a fresh report from the last 7 days before showing it")]
    generate: bool,
}

pub async fn process_dashboard_command(
    DashboardCommand { range }: DashboardCommand,
    store: &impl KeyValueStore,
) -> Result<()> {
    let summary = summarize_range(&range, store, DefaultClock.today()).await;
    println!("{}", render_dashboard(summary.as_ref()));
    Ok(())
}

/// `None` both for a range with no data and for a range that doesn't parse.
async fn summarize_range(
    range: &str,
    store: &impl KeyValueStore,
    today: NaiveDate,
) -> Option<DashboardSummary> {
    match range.parse::<RangeSelector>() {
        Ok(selector) => {
            let data = load_time_data(store).await;
            DashboardSummary::from_range(&range_query(&data, selector, today))
        }
        Err(e) => {
            warn!("Invalid range {range:?}: {e}");
            None
        }
    }
}

pub fn render_dashboard(summary: Option<&DashboardSummary>) -> String {
    let Some(summary) = summary else {
        return EMPTY_STATE.to_owned();
    };

    let mut lines = vec![
        heading("Summary"),
        format!(
            "Productive     {:>8}  {}",
            format_seconds(summary.productive_seconds),
            summary.productive_share
        ),
        format!(
            "Unproductive   {:>8}  {}",
            format_seconds(summary.unproductive_seconds),
            summary.unproductive_share
        ),
        format!(
            "Daily average  {:>8}  over {} day(s)",
            format_seconds(summary.daily_average_seconds),
            summary.days.len()
        ),
        String::new(),
        heading("Time spent by day (minutes)"),
    ];

    lines.extend(summary.days.iter().map(|day| {
        format!(
            "{:<6} {:>5} productive {:>5} unproductive  total {:>8}  productivity {}",
            day.date.format("%-m/%-d"),
            day.productive_minutes,
            day.unproductive_minutes,
            format_seconds(day.total_seconds),
            day.productivity
        )
    }));

    lines.push(String::new());
    lines.push(heading("Top sites"));
    lines.extend(render_sites(&summary.top_sites));
    lines.join("\n")
}

fn render_sites(sites: &[TopSite]) -> impl Iterator<Item = String> + '_ {
    sites.iter().map(|site| {
        let category = match site.category {
            Category::Productive => "productive",
            Category::Unproductive => "unproductive",
        };
        format!(
            "{:<24} {:>8}  {category}",
            shorten_site_name(&site.hostname),
            format_seconds(site.seconds)
        )
    })
}

pub async fn process_weekly_command(
    WeeklyCommand { generate }: WeeklyCommand,
    sync: &impl KeyValueStore,
    local: &impl KeyValueStore,
) -> Result<()> {
    if generate {
        let reporter =
            WeeklyReporter::new(sync, local, Box::new(ConsoleNotifier), Box::new(DefaultClock));
        reporter.generate(Trigger::OnDemand).await?;
    }
    println!("{}", render_weekly(load_weekly_report(local).await.as_ref()));
    Ok(())
}

pub fn render_weekly(report: Option<&WeeklyReportSnapshot>) -> String {
    let Some(report) = report else {
        return "No weekly report yet, run with --generate to create one".to_owned();
    };

    let mut lines = vec![
        heading("Weekly report"),
        format!(
            "Productive     {:>8}  {}",
            format_seconds(report.productive_seconds),
            productive_percentage(report.productive_seconds, report.unproductive_seconds)
                .unwrap_or_default()
        ),
        format!(
            "Unproductive   {:>8}",
            format_seconds(report.unproductive_seconds)
        ),
        String::new(),
        heading("Top sites"),
    ];
    lines.extend(render_sites(&report.top_sites));
    lines.join("\n")
}
