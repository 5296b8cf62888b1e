//! Durable single-file key-value store.

use super::{KvStore, StoreError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// `KvStore` persisted as one JSON document on disk.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// `put_many` batch is visible in full or not at all even across a crash.
/// A single writer lock serializes batches; the store is scoped to one
/// client instance, not shared across processes.
#[derive(Debug)]
pub struct JsonFileKvStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileKvStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
                key: self.path.display().to_string(),
                reason: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(StoreError::Io(e.to_string())),
        }
    }
}

#[async_trait]
impl KvStore for JsonFileKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load().await?.get(key).cloned())
    }

    async fn put_many(&self, pairs: &[(String, String)]) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut map = self.load().await?;
        for (key, value) in pairs {
            map.insert(key.clone(), value.clone());
        }

        let encoded =
            serde_json::to_string_pretty(&map).map_err(|e| StoreError::Encode(e.to_string()))?;

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, encoded)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_path(dir: &TempDir) -> PathBuf {
        dir.path().join("ledger.json")
    }

    #[tokio::test]
    async fn test_empty_store_reads_none() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileKvStore::new(store_path(&dir));
        assert!(store.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);

        let store = JsonFileKvStore::new(&path);
        store
            .put_many(&[("balance".to_string(), "100".to_string())])
            .await
            .unwrap();
        drop(store);

        let reopened = JsonFileKvStore::new(&path);
        assert_eq!(
            reopened.get("balance").await.unwrap().as_deref(),
            Some("100")
        );
    }

    #[tokio::test]
    async fn test_batch_lands_together() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileKvStore::new(store_path(&dir));
        store
            .put_many(&[
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string()),
            ])
            .await
            .unwrap();
        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("1"));
        assert_eq!(store.get("b").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_corrupt_file_surfaces_error() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);
        tokio::fs::write(&path, "not json").await.unwrap();

        let store = JsonFileKvStore::new(&path);
        match store.get("k").await {
            Err(StoreError::Corrupt { .. }) => {}
            other => panic!("expected Corrupt, got {:?}", other),
        }
    }
}
