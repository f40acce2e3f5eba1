//! File-backed key-value storage.
//!
//! The durable counterpart of the browser's localStorage: a single JSON
//! object persisted to disk, one entry per key.

use crate::{KeyValueStorage, StorageError, StorageResult};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Key-value storage persisted as a JSON file.
///
/// All operations rewrite the whole file under a mutex, so a compound
/// value stored under one key is never observable half-written.
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    /// Create a storage backed by the given file. The file is created
    /// lazily on first write.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    fn read_map(&self) -> StorageResult<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_str(&content).map_err(|e| StorageError::Encoding(e.to_string()))
    }

    fn write_map(&self, map: &HashMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            serde_json::to_string_pretty(map).map_err(|e| StorageError::Encoding(e.to_string()))?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(self.read_map()?.get(key).cloned())
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut map = self.read_map()?;
        let removed = map.remove(key).is_some();
        if removed {
            self.write_map(&map)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_set_and_get() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("store.json"));

        storage.set("alpha", "one").unwrap();
        assert_eq!(storage.get("alpha").unwrap(), Some("one".to_string()));
        assert_eq!(storage.get("missing").unwrap(), None);
    }

    #[test]
    fn test_overwrite() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("store.json"));

        storage.set("alpha", "one").unwrap();
        storage.set("alpha", "two").unwrap();
        assert_eq!(storage.get("alpha").unwrap(), Some("two".to_string()));
    }

    #[test]
    fn test_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("store.json"));

        storage.set("alpha", "one").unwrap();
        assert!(storage.delete("alpha").unwrap());
        assert!(!storage.delete("alpha").unwrap());
        assert_eq!(storage.get("alpha").unwrap(), None);
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        {
            let storage = FileStorage::new(path.clone());
            storage.set("alpha", "one").unwrap();
        }

        let storage = FileStorage::new(path);
        assert_eq!(storage.get("alpha").unwrap(), Some("one".to_string()));
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nope.json"));

        assert_eq!(storage.get("anything").unwrap(), None);
        assert!(!storage.has("anything").unwrap());
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested").join("store.json"));

        storage.set("alpha", "one").unwrap();
        assert_eq!(storage.get("alpha").unwrap(), Some("one".to_string()));
    }
}
