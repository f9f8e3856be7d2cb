//! Store selected at runtime

use std::path::Path;

use super::DashboardCache;
use super::storage::SqliteStore;
use super::store::{KeyValueStore, MemoryStore, StorageUsage};
use crate::error::CacheError;

/// Persistent store, or an in-memory one for `--no-cache` runs
pub enum StoreBackend {
    Sqlite(SqliteStore),
    Memory(MemoryStore),
}

impl StoreBackend {
    /// Open the SQLite store in `dir`, falling back to memory if it cannot
    /// be opened.
    pub fn open_or_memory(dir: &Path, capacity: Option<usize>) -> Self {
        match SqliteStore::open_at(dir, capacity) {
            Ok(store) => StoreBackend::Sqlite(store),
            Err(e) => {
                log::warn!(
                    "Cannot open cache in {}, caching in memory only: {}",
                    dir.display(),
                    e
                );
                StoreBackend::Memory(Self::memory(capacity))
            }
        }
    }

    pub fn memory(capacity: Option<usize>) -> MemoryStore {
        match capacity {
            Some(capacity) => MemoryStore::with_capacity(capacity),
            None => MemoryStore::new(),
        }
    }

    /// Database file, when persistent
    pub fn location(&self) -> Option<&Path> {
        match self {
            StoreBackend::Sqlite(store) => Some(store.db_path()),
            StoreBackend::Memory(_) => None,
        }
    }
}

impl KeyValueStore for StoreBackend {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match self {
            StoreBackend::Sqlite(store) => store.get(key),
            StoreBackend::Memory(store) => store.get(key),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        match self {
            StoreBackend::Sqlite(store) => store.set(key, value),
            StoreBackend::Memory(store) => store.set(key, value),
        }
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        match self {
            StoreBackend::Sqlite(store) => store.remove(key),
            StoreBackend::Memory(store) => store.remove(key),
        }
    }

    fn estimate_usage(&self) -> Result<StorageUsage, CacheError> {
        match self {
            StoreBackend::Sqlite(store) => store.estimate_usage(),
            StoreBackend::Memory(store) => store.estimate_usage(),
        }
    }
}

impl DashboardCache<StoreBackend> {
    /// Database file backing the cache, if persistent
    pub fn location(&self) -> Option<&Path> {
        self.store.location()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_backend_has_location() {
        let dir = tempfile::tempdir().unwrap();
        let backend = StoreBackend::open_or_memory(dir.path(), None);

        backend.set("k", "v").unwrap();
        assert_eq!(backend.get("k").unwrap(), Some("v".to_string()));
        assert_eq!(backend.location(), Some(dir.path().join("store.db").as_path()));
    }

    #[test]
    fn test_unusable_dir_falls_back_to_memory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, "x").unwrap();

        let backend = StoreBackend::open_or_memory(&file, Some(10));
        assert!(backend.location().is_none());
        assert!(backend.set("key", "too long for ten bytes").unwrap_err().is_quota());
    }
}
