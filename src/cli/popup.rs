use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use tokio::io::AsyncReadExt;
use tracing::info;

use crate::{
    daemon::{
        protocol::Notification,
        storage::{
            entities::DayBucket,
            repository::{load_day, load_productive_sites, save_productive_sites},
            store::KeyValueStore,
        },
        surface::Notifier,
    },
    report::indicator::PopupProgress,
    sites::SiteList,
    utils::{
        clock::{Clock, DefaultClock},
        time::format_seconds,
    },
};

use super::{
    console::{heading, tier_colour, ConsoleNotifier},
    Args,
};

const PROGRESS_WIDTH: u32 = 20;
pub const SETTINGS_SAVED_TITLE: &str = "Settings Saved";
pub const SETTINGS_SAVED_MESSAGE: &str = "Your productive websites list has been updated.";

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Parser)]
pub struct TodayCommand {
    #[arg(
        long,
        short,
        help = "Day to show instead of today. Examples are \"yesterday\", \"3 days ago\", \"15/03/2025\""
    )]
    date: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

#[derive(Debug, Subcommand)]
pub enum SitesCommand {
    #[command(about = "Print the productive list, one pattern per line")]
    Show,
    #[command(about = "Replace the productive list with the lines of a file")]
    Set {
        #[arg(help = "File with one pattern per line, - reads stdin")]
        source: PathBuf,
    },
    #[command(about = "Go back to the built-in productive list")]
    Reset,
}

/// Same view as the extension popup: today's two totals and the productivity bar.
pub async fn process_today_command(
    TodayCommand { date, date_style }: TodayCommand,
    store: &impl KeyValueStore,
) -> Result<()> {
    let date = match date {
        Some(date) => parse_day(&date, date_style)?,
        None => DefaultClock.today(),
    };
    let bucket = load_day(store, date).await;
    println!("{}", render_day(date, &bucket));
    Ok(())
}

fn parse_day(date: &str, date_style: DateStyle) -> Result<NaiveDate> {
    match parse_date_string(date, Local::now(), date_style.into()) {
        Ok(v) => Ok(v.date_naive()),
        Err(e) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate date {date:?}: {e}"),
            )
            .into()),
    }
}

pub fn render_day(date: NaiveDate, bucket: &DayBucket) -> String {
    let progress = PopupProgress::for_bucket(bucket);
    let filled = progress
        .percentage
        .map(|p| *p * PROGRESS_WIDTH / 100)
        .unwrap_or_default();
    let bar = format!(
        "{}{}",
        "#".repeat(filled as usize),
        "-".repeat((PROGRESS_WIDTH - filled) as usize)
    );

    [
        heading(&date.format("%Y-%m-%d").to_string()),
        format!("Productive    {}", format_seconds(bucket.productive_seconds)),
        format!("Unproductive  {}", format_seconds(bucket.unproductive_seconds)),
        format!(
            "[{}] {}",
            tier_colour(progress.tier).paint(bar),
            tier_colour(progress.tier).paint(progress.label)
        ),
    ]
    .join("\n")
}

pub async fn process_sites_command(command: SitesCommand, store: &impl KeyValueStore) -> Result<()> {
    match command {
        SitesCommand::Show => {
            println!("{}", load_productive_sites(store).await.to_editor_text());
            Ok(())
        }
        SitesCommand::Set { source } => {
            let text = read_source(&source).await?;
            save_sites(store, &SiteList::parse(&text), &ConsoleNotifier).await
        }
        SitesCommand::Reset => save_sites(store, &SiteList::default(), &ConsoleNotifier).await,
    }
}

async fn read_source(source: &Path) -> Result<String> {
    let mut text = String::new();
    if source.as_os_str() == "-" {
        tokio::io::stdin().read_to_string(&mut text).await?;
    } else {
        text = tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("Reading {source:?}"))?;
    }
    Ok(text)
}

/// Stores the list and confirms it, like the popup's save button.
pub async fn save_sites(
    store: &impl KeyValueStore,
    sites: &SiteList,
    notifier: &dyn Notifier,
) -> Result<()> {
    save_productive_sites(store, sites).await?;
    info!("Saved {} productive patterns", sites.patterns().len());
    notifier.notify(&Notification {
        title: SETTINGS_SAVED_TITLE.into(),
        message: SETTINGS_SAVED_MESSAGE.into(),
        context_message: None,
    })
}
