use chrono::{DateTime, NaiveDate, Utc};

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// This is the standard way of converting a date to a storage key in sitetally.
pub fn date_to_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Inverse of [date_to_key]. Keys written by something else are simply not dates.
pub fn key_to_date(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, DATE_KEY_FORMAT).ok()
}

/// Whole seconds between two moments, rounded to the nearest second. Negative when `end` is
/// before `start`.
pub fn elapsed_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    ((end - start).num_milliseconds() as f64 / 1000.).round() as i64
}

/// Formats seconds the way every surface displays them: `2h 5m` or `5m`.
pub fn format_seconds(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Seconds as whole minutes, rounded half up.
pub fn rounded_minutes(seconds: u64) -> u64 {
    seconds.saturating_add(30) / 60
}

/// Adds up stored seconds. Stored totals can come from anywhere, so this stops at [u64::MAX]
/// instead of overflowing.
pub fn sum_seconds(seconds: impl IntoIterator<Item = u64>) -> u64 {
    seconds.into_iter().fold(0, u64::saturating_add)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    #[test]
    fn test_date_key_format() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(date_to_key(date), "2024-01-02");
        assert_eq!(key_to_date("2024-01-02"), Some(date));
        assert_eq!(key_to_date("yesterday"), None);
    }

    #[test]
    fn test_elapsed_rounding() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        assert_eq!(elapsed_seconds(start, start + Duration::milliseconds(4499)), 4);
        assert_eq!(elapsed_seconds(start, start + Duration::milliseconds(4500)), 5);
        assert!(elapsed_seconds(start + Duration::seconds(10), start) < 0);
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(0), "0m");
        assert_eq!(format_seconds(59), "0m");
        assert_eq!(format_seconds(61 * 60), "1h 1m");
        assert_eq!(format_seconds(2 * 3600 + 5 * 60 + 59), "2h 5m");
    }

    #[test]
    fn test_rounded_minutes() {
        assert_eq!(rounded_minutes(29), 0);
        assert_eq!(rounded_minutes(30), 1);
        assert_eq!(rounded_minutes(150), 3);
        assert_eq!(rounded_minutes(u64::MAX), u64::MAX / 60);
    }

    #[test]
    fn test_sum_seconds_saturates() {
        assert_eq!(sum_seconds([1, 2, 3]), 6);
        assert_eq!(sum_seconds([]), 0);
        assert_eq!(sum_seconds([u64::MAX - 1, 5, 7]), u64::MAX);
    }
}
