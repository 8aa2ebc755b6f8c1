//! File-backed key-value storage.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use workbench_core::error::{Result, WorkbenchError};
use workbench_core::storage::KeyValueStorage;

use super::atomic_json::AtomicJsonFile;

/// Key-value storage keeping one JSON file per key.
///
/// Directory structure:
/// ```text
/// base_dir/
/// ├── TreeState.json
/// └── <key>.json
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    base_dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// File backing `key`. Keys are limited to `[A-Za-z0-9._-]` so they can
    /// never escape the base directory.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !valid {
            return Err(WorkbenchError::config(format!("Invalid storage key: '{}'", key)));
        }
        Ok(self.base_dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStorage for JsonFileStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let file = AtomicJsonFile::<Value>::new(self.path_for(key)?);
        tokio::task::spawn_blocking(move || file.load())
            .await
            .map_err(|e| WorkbenchError::storage_read(format!("Read task failed: {}", e)))?
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let file = AtomicJsonFile::<Value>::new(self.path_for(key)?);
        tracing::debug!("[JsonFileStorage] Writing {}", file.path().display());
        tokio::task::spawn_blocking(move || file.save(&value))
            .await
            .map_err(|e| WorkbenchError::storage_write(format!("Write task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_get_missing_key() {
        let temp_dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(temp_dir.path());

        assert!(storage.get("TreeState").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let temp_dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(temp_dir.path().join("state"));

        storage
            .set("TreeState", json!({ "roots": [] }))
            .await
            .unwrap();

        assert!(temp_dir.path().join("state").join("TreeState.json").exists());
        assert_eq!(
            storage.get("TreeState").await.unwrap(),
            Some(json!({ "roots": [] }))
        );
    }

    #[test]
    fn test_rejects_keys_that_escape_base_dir() {
        let storage = JsonFileStorage::new("/tmp/workbench");
        assert!(storage.path_for("../etc/passwd").is_err());
        assert!(storage.path_for("a/b").is_err());
        assert!(storage.path_for("").is_err());
        assert!(storage.path_for(".hidden").is_err());
        assert!(storage.path_for("TreeState.v1").is_ok());
    }
}
