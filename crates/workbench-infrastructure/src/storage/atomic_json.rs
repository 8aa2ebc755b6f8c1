//! Atomic JSON file operations.
//!
//! Provides a thin layer for safe access to JSON state files shared by
//! several host windows.

use fs2::FileExt;
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use workbench_core::error::{Result, WorkbenchError};

/// Distinguishes temp files of writers within one process.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A handle to a JSON file that is replaced atomically on every save.
///
/// Provides:
/// - **Atomicity**: Updates are all-or-nothing via tmp file + atomic rename
/// - **Isolation**: An exclusive lock file serializes writers across processes
/// - **Durability**: Explicit fsync before rename
///
/// Concurrent writers are serialized, not merged: the last one wins.
pub struct AtomicJsonFile<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> AtomicJsonFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the JSON file and deserializes it.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: Successfully loaded and deserialized
    /// - `Ok(None)`: File doesn't exist or is empty
    /// - `Err(StorageRead)`: Failed to read or parse the file
    pub fn load(&self) -> Result<Option<T>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            WorkbenchError::storage_read(format!("{}: {}", self.path.display(), e))
        })?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        let data: T = serde_json::from_str(&content).map_err(|e| {
            WorkbenchError::storage_read(format!("{}: {}", self.path.display(), e))
        })?;
        Ok(Some(data))
    }

    /// Saves data to the JSON file atomically while holding the lock file.
    pub fn save(&self, data: &T) -> Result<()> {
        let _lock = self.acquire_lock()?;
        self.write_atomically(data)
            .map_err(|e| WorkbenchError::storage_write(format!("{}: {}", self.path.display(), e)))
    }

    fn write_atomically(&self, data: &T) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(data)?;

        // Write to temporary file in the same directory
        let tmp_path = self.get_temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(json.as_bytes())?;

        // Ensure data is written to disk
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    /// Gets a temporary file path for atomic writes, unique per writer.
    fn get_temp_path(&self) -> Result<PathBuf> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| WorkbenchError::internal("Path has no parent directory"))?;

        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| WorkbenchError::internal("Path has no file name"))?;

        let tmp_name = format!(
            ".{}.{}.{}.tmp",
            file_name.to_string_lossy(),
            process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        );
        Ok(parent.join(tmp_name))
    }

    fn acquire_lock(&self) -> Result<FileLock> {
        FileLock::acquire(&self.path)
    }
}

/// Exclusive lock on `<name>.lock`, released when the guard is dropped.
///
/// The lock file itself is never removed: every writer must lock the same
/// inode.
struct FileLock {
    file: File,
}

impl FileLock {
    /// Acquires an exclusive lock on the given path.
    fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        file.lock_exclusive().map_err(|e| {
            WorkbenchError::storage_write(format!("Failed to acquire lock: {}", e))
        })?;

        Ok(FileLock { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicJsonFile::<Value>::new(temp_dir.path().join("TreeState.json"));

        file.save(&json!({ "roots": [] })).unwrap();

        let loaded = file.load().unwrap().unwrap();
        assert_eq!(loaded, json!({ "roots": [] }));
    }

    #[test]
    fn test_load_nonexistent_or_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.json");
        let file = AtomicJsonFile::<Value>::new(path.clone());
        assert!(file.load().unwrap().is_none());

        fs::write(&path, "  \n").unwrap();
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file_is_read_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();

        let err = AtomicJsonFile::<Value>::new(path).load().unwrap_err();
        assert!(matches!(err, WorkbenchError::StorageRead(_)));
    }

    fn temp_files(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp"))
            .collect()
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_file_and_keeps_lock_file() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("nested");
        let path = dir.join("state.json");
        let file = AtomicJsonFile::<Value>::new(path.clone());

        file.save(&json!({ "a": 1 })).unwrap();
        file.save(&json!({ "a": 2 })).unwrap();

        assert!(path.exists());
        assert!(temp_files(&dir).is_empty());
        assert!(dir.join("state.lock").exists());
        assert_eq!(file.load().unwrap().unwrap(), json!({ "a": 2 }));
    }

    #[test]
    fn test_temp_paths_are_unique_per_write() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicJsonFile::<Value>::new(temp_dir.path().join("state.json"));

        assert_ne!(file.get_temp_path().unwrap(), file.get_temp_path().unwrap());
    }

    #[test]
    fn test_concurrent_writers_never_tear_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.json");
        let filler = "x".repeat(64 * 1024);

        let writers: Vec<_> = (0..2)
            .map(|writer| {
                let file = AtomicJsonFile::<Value>::new(path.clone());
                let filler = filler.clone();
                std::thread::spawn(move || {
                    for round in 0..25 {
                        file.save(&json!({ "writer": writer, "round": round, "filler": filler }))
                            .unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let loaded = AtomicJsonFile::<Value>::new(path).load().unwrap().unwrap();
        assert_eq!(loaded["round"], json!(24));
        assert_eq!(loaded["filler"], json!(filler));
        assert!(temp_files(temp_dir.path()).is_empty());
    }
}
