//! Durable string-keyed map contract and its two stock implementations.
//!
//! Throttle state persists through this seam. The contract is
//! deliberately small: get/put/remove by UTF-8 key, plus an explicit
//! `commit` for stores that buffer writes. The on-disk format of any real
//! embedded store stays behind the trait.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::info;

use crate::error::StoreError;

/// Durable map addressed by opaque UTF-8 string keys.
pub trait StateStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove the entry under `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Flush buffered writes to durable storage.
    fn commit(&self) -> Result<(), StoreError>;
}

/// In-memory [`StateStore`].
///
/// The degraded-durability mode and the test double: identical decisions,
/// nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("entries lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .entries
            .read()
            .expect("entries lock poisoned")
            .get(key)
            .cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .expect("entries lock poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .expect("entries lock poisoned")
            .remove(key);
        Ok(())
    }

    fn commit(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Single-file JSON [`StateStore`].
///
/// The whole map is loaded at open and rewritten on `commit` via a
/// temp-file rename, so a crash mid-write leaves the previous file intact.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, loading existing entries if the file exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            serde_json::from_str(&contents).map_err(|e| StoreError::Serialize(e.to_string()))?
        } else {
            HashMap::new()
        };
        info!(path = %path.display(), "opened state store");
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .entries
            .read()
            .expect("entries lock poisoned")
            .get(key)
            .cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .expect("entries lock poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .expect("entries lock poisoned")
            .remove(key);
        Ok(())
    }

    fn commit(&self) -> Result<(), StoreError> {
        let json = {
            let entries = self.entries.read().expect("entries lock poisoned");
            serde_json::to_string_pretty(&*entries)
                .map_err(|e| StoreError::Serialize(e.to_string()))?
        };
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_put_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.put("k", "v1").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v1".to_string()));

        store.put("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v2".to_string()));

        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
        store.remove("k").unwrap();
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        {
            let store = FileStore::open(&path).unwrap();
            store.put("throttle.cpu", r#"{"granted":1}"#).unwrap();
            store.commit().unwrap();
        }

        let store = FileStore::open(&path).unwrap();
        assert_eq!(
            store.get("throttle.cpu").unwrap(),
            Some(r#"{"granted":1}"#.to_string())
        );
    }

    #[test]
    fn file_store_uncommitted_writes_are_lost() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        {
            let store = FileStore::open(&path).unwrap();
            store.put("k", "v").unwrap();
            // no commit
        }

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(
            FileStore::open(&path),
            Err(StoreError::Serialize(_))
        ));
    }
}
