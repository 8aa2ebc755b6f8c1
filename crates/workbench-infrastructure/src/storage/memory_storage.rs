//! In-process key-value storage.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use workbench_core::error::{Result, WorkbenchError};
use workbench_core::storage::KeyValueStorage;

/// Storage that keeps values in memory.
///
/// Used by hosts that do not persist between runs and by tests, which can
/// count writes and make writes fail on demand.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, Value>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `set` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Makes every following `set` fail with `StorageWrite`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Stores a raw value without counting it as a write.
    pub async fn seed(&self, key: &str, value: Value) {
        self.entries.write().await.insert(key.to_string(), value);
    }
}

#[async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(WorkbenchError::storage_write("memory storage is read-only"));
        }
        self.entries.write().await.insert(key.to_string(), value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_counts_writes() {
        let storage = MemoryStorage::new();
        storage.set("k", json!(1)).await.unwrap();
        storage.set("k", json!(2)).await.unwrap();

        assert_eq!(storage.write_count(), 2);
        assert_eq!(storage.get("k").await.unwrap(), Some(json!(2)));
    }

    #[tokio::test]
    async fn test_failing_writes_keep_previous_value() {
        let storage = MemoryStorage::new();
        storage.seed("k", json!("old")).await;
        storage.set_fail_writes(true);

        assert!(storage.set("k", json!("new")).await.is_err());
        assert_eq!(storage.get("k").await.unwrap(), Some(json!("old")));
        assert_eq!(storage.write_count(), 0);
    }
}
