use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Result;
use fs4::tokio::AsyncFileExt;
use serde_json::{Map, Value};
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt},
    sync::broadcast,
};
use tracing::{debug, warn};

use super::store::{KeyValueStore, StoreArea, StoreChange};

const CHANGE_CAPACITY: usize = 16;
const STORAGE_DIR: &str = "storage";

/// Opens the `sync` and `local` documents kept under `application_dir`.
pub fn open_areas(application_dir: &Path) -> Result<(FileStore, FileStore), std::io::Error> {
    let storage_dir = application_dir.join(STORAGE_DIR);
    Ok((
        FileStore::new(&storage_dir, StoreArea::Sync)?,
        FileStore::new(&storage_dir, StoreArea::Local)?,
    ))
}

/// The main realization of [KeyValueStore]. One JSON document per area, shared with other
/// processes through advisory file locks.
pub struct FileStore {
    path: PathBuf,
    area: StoreArea,
    changes: broadcast::Sender<StoreChange>,
}

impl FileStore {
    pub fn new(storage_dir: &Path, area: StoreArea) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(storage_dir)?;
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);

        Ok(Self {
            path: storage_dir.join(area.file_name()),
            area,
            changes,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<Map<String, Value>> {
        async fn extract(path: &Path) -> std::result::Result<String, std::io::Error> {
            debug!("Reading {path:?}");
            let mut file = File::open(path).await?;
            file.lock_shared()?;
            let mut content = String::new();
            let result = file.read_to_string(&mut content).await;
            file.unlock_async().await?;
            result?;
            Ok(content)
        }

        match extract(&self.path).await {
            Ok(content) => Ok(parse_document(&self.path, &content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e)?,
        }
    }

    async fn write_document(&self, items: Map<String, Value>) -> Result<()> {
        let mut file = File::options()
            .write(true)
            .create(true)
            .read(true)
            .truncate(false)
            .open(&self.path)
            .await?;

        // Semi-safe acquire-release for a file
        file.lock_exclusive()?;
        let result = merge_into_file(&self.path, &mut file, items).await;
        file.unlock_async().await?;
        result
    }
}

fn parse_document(path: &Path, content: &str) -> Map<String, Value> {
    if content.trim().is_empty() {
        return Map::new();
    }
    match serde_json::from_str::<Map<String, Value>>(content) {
        Ok(v) => v,
        Err(e) => {
            // A half written file is treated as empty rather than taking the host down.
            warn!("Store document {path:?} is not a json object: {e}");
            Map::new()
        }
    }
}

async fn merge_into_file(path: &Path, file: &mut File, items: Map<String, Value>) -> Result<()> {
    file.rewind().await?;
    let mut content = String::new();
    file.read_to_string(&mut content).await?;

    let mut document = parse_document(path, &content);
    document.extend(items);

    let buffer = serde_json::to_vec_pretty(&document)?;
    file.set_len(0).await?;
    file.rewind().await?;
    file.write_all(&buffer).await?;
    file.flush().await?;
    Ok(())
}

impl KeyValueStore for FileStore {
    fn area(&self) -> StoreArea {
        self.area
    }

    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>> {
        let mut document = self.read_document().await?;
        Ok(keys
            .iter()
            .filter_map(|key| document.remove(*key).map(|value| (key.to_string(), value)))
            .collect())
    }

    async fn set(&self, items: Map<String, Value>) -> Result<()> {
        let keys = items.keys().cloned().collect::<Vec<_>>();
        self.write_document(items).await?;
        // Nobody listening is fine.
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

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use serde_json::{json, Map, Value};
    use tempfile::tempdir;

    use super::*;

    fn items(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_missing_document_reads_empty() -> Result<()> {
        let dir = tempdir()?;
        let store = FileStore::new(dir.path(), StoreArea::Sync)?;
        assert!(store.get(&["timeData"]).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_set_merges_keys() -> Result<()> {
        let dir = tempdir()?;
        let store = FileStore::new(dir.path(), StoreArea::Sync)?;

        store
            .set(items(&[("productiveSites", json!(["a.com"]))]))
            .await?;
        store.set(items(&[("timeData", json!({}))])).await?;

        let values = store.get(&["productiveSites", "timeData", "other"]).await?;
        assert_eq!(values.len(), 2);
        assert_eq!(values["productiveSites"], json!(["a.com"]));
        assert_eq!(values["timeData"], json!({}));
        Ok(())
    }

    #[tokio::test]
    async fn test_shorter_rewrite_stays_readable() -> Result<()> {
        let dir = tempdir()?;
        let store = FileStore::new(dir.path(), StoreArea::Local)?;

        store
            .set(items(&[("weeklyReport", json!({ "long": "x".repeat(200) }))]))
            .await?;
        store.set(items(&[("weeklyReport", json!(1))])).await?;

        let values = store.get(&["weeklyReport"]).await?;
        assert_eq!(values["weeklyReport"], json!(1));
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupted_document_reads_empty() -> Result<()> {
        let dir = tempdir()?;
        let store = FileStore::new(dir.path(), StoreArea::Sync)?;
        std::fs::write(store.path(), "{\"timeData\": {")?;

        assert!(store.get(&["timeData"]).await?.is_empty());

        store.set(items(&[("timeData", json!({}))])).await?;
        assert_eq!(store.get(&["timeData"]).await?["timeData"], json!({}));
        Ok(())
    }

    #[tokio::test]
    async fn test_set_notifies_subscribers() -> Result<()> {
        let dir = tempdir()?;
        let store = FileStore::new(dir.path(), StoreArea::Local)?;
        let mut changes = store.subscribe();

        store.set(items(&[("weeklyReport", json!({}))])).await?;

        let change = changes.try_recv()?;
        assert_eq!(change.area, StoreArea::Local);
        assert_eq!(change.keys, vec!["weeklyReport".to_string()]);
        Ok(())
    }
}
