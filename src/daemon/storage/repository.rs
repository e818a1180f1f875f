//! Typed access to the keys sitetally keeps in a [KeyValueStore].
//!
//! Reads never fail: a store that can't be reached, a missing key or a malformed value all come
//! back as the empty (or default) state and a log line.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::{sites::SiteList, utils::time::{date_to_key, key_to_date}};

use super::{
    entities::{Category, DayBucket, TimeData, WeeklyReportSnapshot},
    store::KeyValueStore,
};

pub const PRODUCTIVE_SITES_KEY: &str = "productiveSites";
pub const TIME_DATA_KEY: &str = "timeData";
pub const WEEKLY_REPORT_KEY: &str = "weeklyReport";

fn single(key: &str, value: Value) -> Map<String, Value> {
    let mut items = Map::new();
    items.insert(key.to_owned(), value);
    items
}

async fn get_one(store: &impl KeyValueStore, key: &str) -> Option<Value> {
    match store.get(&[key]).await {
        Ok(mut values) => values.remove(key),
        Err(e) => {
            warn!("Couldn't read {key} from {} store: {e:?}", store.area());
            None
        }
    }
}

/// First run setup: seeds the default productive list and an empty `timeData` when they are
/// missing. Existing values are never replaced.
pub async fn initialize_defaults(store: &impl KeyValueStore) -> Result<()> {
    let existing = store
        .get(&[PRODUCTIVE_SITES_KEY, TIME_DATA_KEY])
        .await
        .context("Reading existing settings")?;

    let mut missing = Map::new();
    if !existing.contains_key(PRODUCTIVE_SITES_KEY) {
        missing.insert(
            PRODUCTIVE_SITES_KEY.into(),
            serde_json::to_value(SiteList::default())?,
        );
    }
    if !existing.contains_key(TIME_DATA_KEY) {
        missing.insert(TIME_DATA_KEY.into(), Value::Object(Map::new()));
    }

    if !missing.is_empty() {
        info!("Initializing {:?}", missing.keys().collect::<Vec<_>>());
        store.set(missing).await?;
    }
    Ok(())
}

/// The user's productive list, or the built-in one if none was saved or it can't be read.
pub async fn load_productive_sites(store: &impl KeyValueStore) -> SiteList {
    let Some(value) = get_one(store, PRODUCTIVE_SITES_KEY).await else {
        return SiteList::default();
    };
    serde_json::from_value(value).unwrap_or_else(|e| {
        warn!("Stored productive sites are malformed, using defaults: {e}");
        SiteList::default()
    })
}

pub async fn save_productive_sites(store: &impl KeyValueStore, sites: &SiteList) -> Result<()> {
    store
        .set(single(PRODUCTIVE_SITES_KEY, serde_json::to_value(sites)?))
        .await
}

fn parse_bucket(key: &str, value: Value) -> DayBucket {
    DayBucket::from_stored(value).unwrap_or_else(|| {
        warn!("Bucket {key} is not an object, treating it as empty");
        DayBucket::default()
    })
}

/// All day buckets keyed by date. Keys that aren't dates are skipped.
pub async fn load_time_data(store: &impl KeyValueStore) -> TimeData {
    let Some(value) = get_one(store, TIME_DATA_KEY).await else {
        return TimeData::new();
    };
    let Value::Object(raw) = value else {
        warn!("Stored {TIME_DATA_KEY} is not an object, treating it as empty");
        return TimeData::new();
    };

    raw.into_iter()
        .filter_map(|(key, value)| match key_to_date(&key) {
            Some(date) => Some((date, parse_bucket(&key, value))),
            None => {
                debug!("Skipping {key}, it's not a date");
                None
            }
        })
        .collect()
}

pub async fn load_day(store: &impl KeyValueStore, date: NaiveDate) -> DayBucket {
    let key = date_to_key(date);
    load_time_data(store)
        .await
        .remove(&date)
        .unwrap_or_else(|| {
            debug!("No bucket for {key}");
            DayBucket::default()
        })
}

/// Read-modify-write of a single day bucket. Only that day's entry is rewritten, every other
/// entry goes back exactly as it was read.
///
/// Unlike the plain loaders this fails when the store can't be read: writing back a `timeData`
/// assembled from nothing would erase every other day.
pub async fn credit_site(
    store: &impl KeyValueStore,
    date: NaiveDate,
    hostname: &str,
    category: Category,
    seconds: u64,
) -> Result<DayBucket> {
    let mut values = store
        .get(&[TIME_DATA_KEY])
        .await
        .context("Reading day buckets")?;

    let mut time_data = match values.remove(TIME_DATA_KEY) {
        Some(Value::Object(v)) => v,
        Some(_) => {
            warn!("Stored {TIME_DATA_KEY} is not an object, starting over");
            Map::new()
        }
        None => Map::new(),
    };

    let key = date_to_key(date);
    let mut bucket = time_data
        .remove(&key)
        .map(|v| parse_bucket(&key, v))
        .unwrap_or_default();
    bucket.credit(hostname, category, seconds);

    time_data.insert(key, serde_json::to_value(&bucket)?);
    store
        .set(single(TIME_DATA_KEY, Value::Object(time_data)))
        .await
        .context("Writing day buckets")?;
    Ok(bucket)
}

pub async fn save_weekly_report(
    store: &impl KeyValueStore,
    report: &WeeklyReportSnapshot,
) -> Result<()> {
    store
        .set(single(WEEKLY_REPORT_KEY, serde_json::to_value(report)?))
        .await
}

pub async fn load_weekly_report(store: &impl KeyValueStore) -> Option<WeeklyReportSnapshot> {
    let value = get_one(store, WEEKLY_REPORT_KEY).await?;
    serde_json::from_value(value)
        .inspect_err(|e| warn!("Stored weekly report is malformed: {e}"))
        .ok()
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use serde_json::json;

    use super::*;
    use crate::daemon::storage::{memory_store::MemoryStore, store::StoreArea};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn store_with(time_data: Value) -> MemoryStore {
        MemoryStore::with_document(StoreArea::Sync, single(TIME_DATA_KEY, time_data))
    }

    #[tokio::test]
    async fn test_initialize_defaults_only_fills_missing_keys() -> Result<()> {
        let store = MemoryStore::with_document(
            StoreArea::Sync,
            single(PRODUCTIVE_SITES_KEY, json!(["a.com"])),
        );

        initialize_defaults(&store).await?;

        let document = store.snapshot();
        assert_eq!(document[PRODUCTIVE_SITES_KEY], json!(["a.com"]));
        assert_eq!(document[TIME_DATA_KEY], json!({}));
        Ok(())
    }

    #[tokio::test]
    async fn test_initialize_defaults_on_empty_store() -> Result<()> {
        let store = MemoryStore::new(StoreArea::Sync);
        initialize_defaults(&store).await?;
        assert_eq!(load_productive_sites(&store).await, SiteList::default());
        Ok(())
    }

    #[tokio::test]
    async fn test_site_list_round_trip() -> Result<()> {
        let store = MemoryStore::new(StoreArea::Sync);
        let sites = SiteList::parse("a.com\nb.com");

        save_productive_sites(&store, &sites).await?;

        assert_eq!(
            load_productive_sites(&store).await.patterns(),
            ["a.com", "b.com"]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_saved_empty_list_is_not_replaced_by_defaults() -> Result<()> {
        let store = MemoryStore::new(StoreArea::Sync);
        save_productive_sites(&store, &SiteList::new(vec![])).await?;
        assert!(load_productive_sites(&store).await.patterns().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_unavailable_store_reads_as_defaults() {
        let store = MemoryStore::new(StoreArea::Sync);
        store.set_offline(true);

        assert_eq!(load_productive_sites(&store).await, SiteList::default());
        assert!(load_time_data(&store).await.is_empty());
        assert_eq!(load_day(&store, date(1)).await, DayBucket::default());
    }

    #[tokio::test]
    async fn test_load_time_data_skips_junk() {
        let store = store_with(json!({
            "2024-01-01": { "productive": 5, "unproductive": 0, "sites": {} },
            "2024-01-02": "garbage",
            "not a date": { "productive": 1 }
        }));

        let data = load_time_data(&store).await;

        assert_eq!(data.len(), 2);
        assert_eq!(data[&date(1)].productive_seconds, 5);
        assert_eq!(data[&date(2)], DayBucket::default());
    }

    #[tokio::test]
    async fn test_credit_site_only_rewrites_one_day() -> Result<()> {
        let store = store_with(json!({
            "2024-01-01": "left alone",
            "2024-01-02": { "productive": 10, "unproductive": 0,
                            "sites": { "github.com": { "time": 10, "category": "productive" } } }
        }));

        let bucket = credit_site(&store, date(2), "github.com", Category::Productive, 5).await?;

        assert_eq!(bucket.productive_seconds, 15);
        let document = store.snapshot();
        assert_eq!(document[TIME_DATA_KEY]["2024-01-01"], json!("left alone"));
        assert_eq!(
            document[TIME_DATA_KEY]["2024-01-02"]["sites"]["github.com"]["time"],
            15
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_credit_site_replaces_malformed_bucket() -> Result<()> {
        let store = store_with(json!({ "2024-01-03": [1, 2, 3] }));

        let bucket = credit_site(&store, date(3), "reddit.com", Category::Unproductive, 7).await?;

        assert_eq!(bucket.unproductive_seconds, 7);
        assert_eq!(bucket.sites.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_credit_site_keeps_bucket_with_unknown_category() -> Result<()> {
        let store = store_with(json!({
            "2024-01-04": { "productive": 3600, "unproductive": 0, "sites": {
                "github.com": { "time": 3600, "category": "productive" },
                "x.com": { "time": 0, "category": "neutral" }
            } }
        }));

        let bucket = credit_site(&store, date(4), "a.com", Category::Unproductive, 5).await?;

        assert_eq!(bucket.productive_seconds, 3600);
        assert_eq!(bucket.unproductive_seconds, 5);
        let stored = &store.snapshot()[TIME_DATA_KEY]["2024-01-04"];
        assert_eq!(stored["productive"], 3600);
        assert_eq!(stored["sites"]["github.com"]["time"], 3600);
        assert_eq!(stored["sites"]["x.com"]["category"], "unproductive");
        assert_eq!(stored["sites"]["a.com"]["time"], 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_credit_site_refuses_to_write_blind() {
        let store = store_with(json!({ "2024-01-01": { "productive": 1 } }));
        store.set_offline(true);

        assert!(
            credit_site(&store, date(2), "a.com", Category::Productive, 5)
                .await
                .is_err()
        );

        store.set_offline(false);
        assert_eq!(load_time_data(&store).await.len(), 1);
    }

    #[tokio::test]
    async fn test_weekly_report_round_trip() -> Result<()> {
        let store = MemoryStore::new(StoreArea::Local);
        assert_eq!(load_weekly_report(&store).await, None);

        let report = WeeklyReportSnapshot {
            productive_seconds: 3,
            unproductive_seconds: 4,
            top_sites: vec![],
        };
        save_weekly_report(&store, &report).await?;

        assert_eq!(load_weekly_report(&store).await, Some(report));
        assert!(store.snapshot()[WEEKLY_REPORT_KEY].get("topSites").is_some());
        Ok(())
    }
}
