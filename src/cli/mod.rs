pub mod console;
pub mod dashboard;
pub mod popup;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dashboard::{process_dashboard_command, process_weekly_command, DashboardCommand, WeeklyCommand};
use popup::{process_sites_command, process_today_command, SitesCommand, TodayCommand};
use tracing::level_filters::LevelFilter;

use crate::{
    daemon::{start_daemon, storage::file_store::open_areas, HostConfig},
    utils::{
        dir::create_application_default_path,
        logging::{enable_logging, CLI_PREFIX, HOST_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "sitetally", version, long_about = None)]
#[command(about = "Time spent on websites, split into productive and unproductive", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, global = true, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(
        about = "Run the extension host directly in current console. Used for debugging, the browser starts sitetally-host itself"
    )]
    Serve {},
    #[command(about = "Today's productive and unproductive time")]
    Today {
        #[command(flatten)]
        command: TodayCommand,
    },
    #[command(about = "Totals, daily chart and top sites for a range of days")]
    Dashboard {
        #[command(flatten)]
        command: DashboardCommand,
    },
    #[command(about = "Show the last weekly report or generate a new one")]
    Weekly {
        #[command(flatten)]
        command: WeeklyCommand,
    },
    #[command(about = "Show or edit the list of productive sites")]
    Sites {
        #[command(subcommand)]
        command: SitesCommand,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    let app_dir = args.dir.map_or_else(create_application_default_path, Ok)?;
    let prefix = match args.commands {
        Commands::Serve {} => HOST_PREFIX,
        _ => CLI_PREFIX,
    };
    enable_logging(prefix, &app_dir, logging_level, args.log)?;

    let (sync, local) = open_areas(&app_dir)?;
    match args.commands {
        Commands::Serve {} => start_daemon(app_dir, HostConfig::default()).await,
        Commands::Today { command } => process_today_command(command, &sync).await,
        Commands::Dashboard { command } => process_dashboard_command(command, &sync).await,
        Commands::Weekly { command } => process_weekly_command(command, &sync, &local).await,
        Commands::Sites { command } => process_sites_command(command, &sync).await,
    }
}
