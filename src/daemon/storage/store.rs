use std::{fmt::Display, future::Future, ops::Deref};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::broadcast;

/// The browser keeps settings and day buckets in a synced area and the weekly snapshot in a
/// local one. Each area is its own store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreArea {
    Sync,
    Local,
}

impl StoreArea {
    pub fn file_name(&self) -> &'static str {
        match self {
            StoreArea::Sync => "sync.json",
            StoreArea::Local => "local.json",
        }
    }
}

impl Display for StoreArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreArea::Sync => write!(f, "sync"),
            StoreArea::Local => write!(f, "local"),
        }
    }
}

/// Pushed to subscribers after every successful [KeyValueStore::set].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreChange {
    pub area: StoreArea,
    pub keys: Vec<String>,
}

/// Interface for abstracting the durable key-value store.
///
/// Reads and writes are not atomic with respect to each other. Within the host every access is
/// serialized by the event queue; writers in other processes simply win or lose.
pub trait KeyValueStore {
    fn area(&self) -> StoreArea;

    /// Returns the values of the requested keys that exist. Absent keys are absent from the map.
    fn get(&self, keys: &[&str]) -> impl Future<Output = Result<Map<String, Value>>>;

    /// Replaces the values of the given keys, leaving other keys untouched.
    fn set(&self, items: Map<String, Value>) -> impl Future<Output = Result<()>>;

    fn subscribe(&self) -> broadcast::Receiver<StoreChange>;
}

impl<T: Deref> KeyValueStore for T
where
    T::Target: KeyValueStore,
{
    fn area(&self) -> StoreArea {
        self.deref().area()
    }

    fn get(&self, keys: &[&str]) -> impl Future<Output = Result<Map<String, Value>>> {
        self.deref().get(keys)
    }

    fn set(&self, items: Map<String, Value>) -> impl Future<Output = Result<()>> {
        self.deref().set(items)
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.deref().subscribe()
    }
}
