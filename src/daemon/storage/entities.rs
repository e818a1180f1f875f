use std::collections::BTreeMap;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// Field names follow the format the browser extension already keeps in its storage, so data
/// written by either side can be read by the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Productive,
    #[default]
    Unproductive,
}

/// Time spent on a single hostname during a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteUsage {
    #[serde(rename = "time", default)]
    pub seconds: u64,
    #[serde(default)]
    pub category: Category,
}

/// Everything tracked during one calendar day. Only ever grows: totals and per site seconds are
/// added to, never subtracted from.
///
/// `productive_seconds + unproductive_seconds` always equals the sum of `sites` seconds as long as
/// the bucket is changed through [DayBucket::credit].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBucket {
    #[serde(rename = "productive", default)]
    pub productive_seconds: u64,
    #[serde(rename = "unproductive", default)]
    pub unproductive_seconds: u64,
    /// Keeps the order in which hostnames were first seen that day.
    #[serde(default)]
    pub sites: IndexMap<String, SiteUsage>,
}

impl DayBucket {
    pub fn total_seconds(&self) -> u64 {
        self.productive_seconds.saturating_add(self.unproductive_seconds)
    }

    /// Reads a stored bucket field by field, so one bad site doesn't cost the whole day. Seconds
    /// that aren't non negative integers are clamped and rounded, unknown categories become
    /// [Category::Unproductive] and site entries that aren't objects are dropped.
    ///
    /// `None` when the value isn't an object at all.
    pub fn from_stored(value: Value) -> Option<Self> {
        let Value::Object(mut fields) = value else {
            return None;
        };
        let sites = match fields.remove("sites") {
            Some(Value::Object(sites)) => sites
                .into_iter()
                .filter_map(|(hostname, site)| {
                    let site = SiteUsage::from_stored(&hostname, site)?;
                    Some((hostname, site))
                })
                .collect(),
            Some(Value::Null) | None => IndexMap::new(),
            Some(other) => {
                warn!("Ignoring sites that aren't an object: {other}");
                IndexMap::new()
            }
        };
        Some(Self {
            productive_seconds: stored_seconds(&fields, "productive"),
            unproductive_seconds: stored_seconds(&fields, "unproductive"),
            sites,
        })
    }

    pub fn seconds_in(&self, category: Category) -> u64 {
        match category {
            Category::Productive => self.productive_seconds,
            Category::Unproductive => self.unproductive_seconds,
        }
    }

    /// Adds `seconds` to the category total and to the hostname. The hostname takes the given
    /// category even if it was recorded under the other one earlier; seconds already added to the
    /// other total stay there.
    pub fn credit(&mut self, hostname: &str, category: Category, seconds: u64) {
        match category {
            Category::Productive => {
                self.productive_seconds = self.productive_seconds.saturating_add(seconds)
            }
            Category::Unproductive => {
                self.unproductive_seconds = self.unproductive_seconds.saturating_add(seconds)
            }
        }
        let site = self
            .sites
            .entry(hostname.to_owned())
            .or_insert(SiteUsage {
                seconds: 0,
                category,
            });
        site.seconds = site.seconds.saturating_add(seconds);
        site.category = category;
    }
}

impl SiteUsage {
    fn from_stored(hostname: &str, value: Value) -> Option<Self> {
        let Value::Object(fields) = value else {
            warn!("Dropping site {hostname} with malformed usage {value}");
            return None;
        };
        let category = match fields.get("category") {
            None | Some(Value::Null) => Category::default(),
            Some(category) => Category::deserialize(category).unwrap_or_else(|e| {
                warn!("Site {hostname} has unknown category {category}, using default: {e}");
                Category::default()
            }),
        };
        Some(Self {
            seconds: stored_seconds(&fields, "time"),
            category,
        })
    }
}

fn stored_seconds(fields: &Map<String, Value>, key: &str) -> u64 {
    match fields.get(key) {
        Some(Value::Number(n)) => n
            .as_u64()
            // Negative and fractional values; `as` saturates out of range floats.
            .unwrap_or_else(|| n.as_f64().map_or(0, |v| v.max(0.0).round() as u64)),
        None | Some(Value::Null) => 0,
        Some(other) => {
            warn!("Ignoring non numeric {key}: {other}");
            0
        }
    }
}

/// Parsed view of the `timeData` key.
pub type TimeData = BTreeMap<NaiveDate, DayBucket>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopSite {
    pub hostname: String,
    #[serde(rename = "time")]
    pub seconds: u64,
    pub category: Category,
}

/// Latest weekly rollup. Only one is kept; generating a new one replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyReportSnapshot {
    #[serde(rename = "productive")]
    pub productive_seconds: u64,
    #[serde(rename = "unproductive")]
    pub unproductive_seconds: u64,
    pub top_sites: Vec<TopSite>,
}
