//! In-memory key-value store for tests and ephemeral sessions.

use super::{KvStore, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// `KvStore` backed by a mutex-guarded map. No durability; every service
/// test and any "guest session" ledger uses this.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    inner: Mutex<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let map = self
            .inner
            .lock()
            .map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(map.get(key).cloned())
    }

    async fn put_many(&self, pairs: &[(String, String)]) -> Result<(), StoreError> {
        let mut map = self
            .inner
            .lock()
            .map_err(|e| StoreError::Io(e.to_string()))?;
        for (key, value) in pairs {
            map.insert(key.clone(), value.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_missing_key_is_none() {
        let store = MemoryKvStore::new();
        assert!(store.get("absent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_many_writes_all_pairs() {
        let store = MemoryKvStore::new();
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
    async fn test_put_overwrites() {
        let store = MemoryKvStore::new();
        store
            .put_many(&[("k".to_string(), "old".to_string())])
            .await
            .unwrap();
        store
            .put_many(&[("k".to_string(), "new".to_string())])
            .await
            .unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("new"));
    }
}
