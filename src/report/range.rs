use std::{fmt::Display, str::FromStr};

use anyhow::{anyhow, bail};
use chrono::{Days, NaiveDate};

use crate::daemon::storage::entities::{DayBucket, TimeData};

/// Which days a dashboard view covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSelector {
    /// Buckets dated `today - n` or later. Always at least one.
    Days(u32),
    All,
}

impl RangeSelector {
    pub fn days(days: u32) -> Option<Self> {
        (days >= 1).then_some(RangeSelector::Days(days))
    }

    /// First date included, `None` for everything.
    pub fn cutoff(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            RangeSelector::Days(days) => Some(
                today
                    .checked_sub_days(Days::new(u64::from(*days)))
                    .unwrap_or(NaiveDate::MIN),
            ),
            RangeSelector::All => None,
        }
    }
}

impl FromStr for RangeSelector {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(RangeSelector::All);
        }
        let Ok(days) = s.parse::<u32>() else {
            bail!("Range should be a number of days or \"all\", got {s:?}");
        };
        RangeSelector::days(days).ok_or_else(|| anyhow!("Range should cover at least one day"))
    }
}

impl Display for RangeSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RangeSelector::Days(days) => write!(f, "{days}"),
            RangeSelector::All => write!(f, "all"),
        }
    }
}

/// Buckets covered by `selector`, oldest first. An empty vector is the normal answer for a store
/// without data in the range.
pub fn range_query(
    data: &TimeData,
    selector: RangeSelector,
    today: NaiveDate,
) -> Vec<(NaiveDate, DayBucket)> {
    let cutoff = selector.cutoff(today);
    data.iter()
        .filter(|(date, _)| cutoff.map_or(true, |cutoff| **date >= cutoff))
        .map(|(date, bucket)| (*date, bucket.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn data(dates: &[NaiveDate]) -> TimeData {
        dates
            .iter()
            .map(|d| (*d, DayBucket::default()))
            .collect()
    }

    #[test]
    fn test_empty_store_gives_empty_range() {
        let result = range_query(&TimeData::new(), RangeSelector::Days(7), date(1, 8));
        assert!(result.is_empty());
    }

    #[test]
    fn test_cutoff_is_inclusive() {
        let data = data(&[date(1, 10), date(1, 3), date(1, 2), date(1, 9)]);

        let dates = range_query(&data, RangeSelector::Days(7), date(1, 10))
            .into_iter()
            .map(|(d, _)| d)
            .collect::<Vec<_>>();

        assert_eq!(dates, vec![date(1, 3), date(1, 9), date(1, 10)]);
    }

    #[test]
    fn test_all_keeps_everything_in_order() {
        let data = data(&[date(3, 1), date(1, 1), date(2, 1)]);
        let dates = range_query(&data, RangeSelector::All, date(1, 1))
            .into_iter()
            .map(|(d, _)| d)
            .collect::<Vec<_>>();
        assert_eq!(dates, vec![date(1, 1), date(2, 1), date(3, 1)]);
    }

    #[test]
    fn test_selector_parsing() {
        assert_eq!("7".parse::<RangeSelector>().unwrap(), RangeSelector::Days(7));
        assert_eq!(" ALL ".parse::<RangeSelector>().unwrap(), RangeSelector::All);
        assert!("0".parse::<RangeSelector>().is_err());
        assert!("-3".parse::<RangeSelector>().is_err());
        assert!("week".parse::<RangeSelector>().is_err());
    }
}
