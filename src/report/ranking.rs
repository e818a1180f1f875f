use indexmap::IndexMap;

use crate::daemon::storage::entities::{DayBucket, SiteUsage, TopSite};

/// Sums seconds per hostname over several days. Hostnames keep the order they were first seen in
/// and take the category of the last day that mentions them.
pub fn merge_sites<'a>(buckets: impl IntoIterator<Item = &'a DayBucket>) -> IndexMap<String, SiteUsage> {
    let mut merged = IndexMap::<String, SiteUsage>::new();
    for bucket in buckets {
        for (hostname, usage) in &bucket.sites {
            let entry = merged.entry(hostname.clone()).or_insert(SiteUsage {
                seconds: 0,
                category: usage.category,
            });
            entry.seconds = entry.seconds.saturating_add(usage.seconds);
            entry.category = usage.category;
        }
    }
    merged
}

/// The `limit` hostnames with the most time, most first. Equal times keep their merge order.
pub fn top_sites(merged: IndexMap<String, SiteUsage>, limit: usize) -> Vec<TopSite> {
    let mut sites = merged
        .into_iter()
        .map(|(hostname, usage)| TopSite {
            hostname,
            seconds: usage.seconds,
            category: usage.category,
        })
        .collect::<Vec<_>>();
    // sort_by is stable
    sites.sort_by(|a, b| b.seconds.cmp(&a.seconds));
    sites.truncate(limit);
    sites
}

/// Display name for a hostname: no `www.` in front, no `.com` at the end.
pub fn shorten_site_name(hostname: &str) -> &str {
    let name = hostname.strip_prefix("www.").unwrap_or(hostname);
    name.strip_suffix(".com").unwrap_or(name)
}
