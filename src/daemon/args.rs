use std::{path::PathBuf, time::Duration};

use clap::Parser;
use tracing::level_filters::LevelFilter;

use super::{HostConfig, DEFAULT_IDLE_DETECTION_SECONDS};

/// Extension host for sitetally. Reads one json event per line from stdin and answers the same
/// way on stdout.
#[derive(Parser)]
#[command(version)]
pub struct HostArgs {
    /// Directory holding storage and logs. Defaults to the per user state directory.
    #[arg(long)]
    pub dir: Option<PathBuf>,
    /// Mirror logs to stderr. This option is for debugging purposes only.
    #[arg(long = "log-console")]
    pub log_console: bool,
    #[arg(long = "log-filter")]
    pub log: Option<LevelFilter>,
    /// Hours between two periodic weekly reports.
    #[arg(long = "weekly-interval-hours", default_value_t = 168, value_parser = clap::value_parser!(u64).range(1..))]
    pub weekly_interval_hours: u64,
    /// Seconds without input before the browser reports the user as idle.
    #[arg(long = "idle-detection-seconds", default_value_t = DEFAULT_IDLE_DETECTION_SECONDS, value_parser = clap::value_parser!(u32).range(15..))]
    pub idle_detection_seconds: u32,
}

impl HostArgs {
    pub fn host_config(&self) -> HostConfig {
        HostConfig {
            weekly_interval: Duration::from_secs(self.weekly_interval_hours * 60 * 60),
            idle_detection_seconds: self.idle_detection_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::collection::alarm::WEEK;

    #[test]
    fn test_defaults_match_host_config() {
        let args = HostArgs::parse_from(["sitetally-host"]);
        let config = args.host_config();
        assert_eq!(config.weekly_interval, WEEK);
        assert_eq!(config.idle_detection_seconds, 30);
    }

    #[test]
    fn test_about_describes_json_lines() {
        use clap::CommandFactory;

        let about = HostArgs::command()
            .get_about()
            .map(|v| v.to_string())
            .unwrap_or_default();
        assert!(about.contains("one json event per line"));
    }

    #[test]
    fn test_idle_interval_has_a_floor() {
        assert!(HostArgs::try_parse_from(["sitetally-host", "--idle-detection-seconds", "5"]).is_err());
        let args =
            HostArgs::try_parse_from(["sitetally-host", "--weekly-interval-hours", "24"]).unwrap();
        assert_eq!(args.host_config().weekly_interval, Duration::from_secs(86400));
    }
}
