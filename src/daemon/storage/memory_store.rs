use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use anyhow::{bail, Result};
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use super::store::{KeyValueStore, StoreArea, StoreChange};

/// In-process [KeyValueStore]. Can be switched offline to act like a store that is temporarily
/// unavailable.
pub struct MemoryStore {
    area: StoreArea,
    document: Mutex<Map<String, Value>>,
    offline: AtomicBool,
    changes: broadcast::Sender<StoreChange>,
}

impl MemoryStore {
    pub fn new(area: StoreArea) -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            area,
            document: Mutex::new(Map::new()),
            offline: AtomicBool::new(false),
            changes,
        }
    }

    pub fn with_document(area: StoreArea, document: Map<String, Value>) -> Self {
        let store = Self::new(area);
        *store.lock() = document;
        store
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Copy of everything stored.
    pub fn snapshot(&self) -> Map<String, Value> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Map<String, Value>> {
        // The map is only touched by whole-value replacements, a poisoned lock still holds a
        // consistent map.
        self.document.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            bail!("{} store is unavailable", self.area);
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn area(&self) -> StoreArea {
        self.area
    }

    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>> {
        self.check_online()?;
        let document = self.lock();
        Ok(keys
            .iter()
            .filter_map(|key| document.get(*key).map(|v| (key.to_string(), v.clone())))
            .collect())
    }

    async fn set(&self, items: Map<String, Value>) -> Result<()> {
        self.check_online()?;
        let keys = items.keys().cloned().collect::<Vec<_>>();
        self.lock().extend(items);
        let _ = self.changes.send(StoreChange {
            area: self.area,
            keys,
        });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}
