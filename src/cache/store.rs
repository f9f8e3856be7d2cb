//! Key-value store capability backing the caches
//!
//! The caches only need string keys, string values and a way to tell how
//! full the store is. Writes may be rejected when a capacity ceiling is hit.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::error::CacheError;

type Result<T> = std::result::Result<T, CacheError>;

/// String-keyed persistent store with an optional capacity ceiling.
pub trait KeyValueStore: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    ///
    /// Fails with [`CacheError::QuotaExceeded`] when the write would push the
    /// store past its capacity.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Bytes in use and the capacity ceiling, if any
    fn estimate_usage(&self) -> Result<StorageUsage>;
}

/// Space used by a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StorageUsage {
    pub used_bytes: usize,
    pub capacity_bytes: Option<usize>,
}

/// Size an entry is charged against the capacity
pub(crate) fn entry_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

/// In-process store, used with `--no-cache` and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    capacity: Option<usize>,
    #[cfg(test)]
    rejected_writes: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects writes beyond `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    fn entries(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| CacheError::Io("memory store lock poisoned".to_string()))
    }

    /// Make the next `count` writes fail as if the quota were exceeded.
    #[cfg(test)]
    pub fn reject_next_writes(&self, count: usize) {
        *self.rejected_writes.lock().unwrap() = count;
    }

    /// Write a raw value, bypassing capacity checks (for seeding corrupt data).
    #[cfg(test)]
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    #[cfg(test)]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        #[cfg(test)]
        {
            let mut rejected = self.rejected_writes.lock().unwrap();
            if *rejected > 0 {
                *rejected -= 1;
                return Err(CacheError::QuotaExceeded {
                    needed: entry_size(key, value),
                    capacity: self.capacity.unwrap_or(0),
                });
            }
        }

        let mut entries = self.entries()?;

        if let Some(capacity) = self.capacity {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| entry_size(k, v))
                .sum();
            let needed = others + entry_size(key, value);
            if needed > capacity {
                return Err(CacheError::QuotaExceeded { needed, capacity });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries()?.remove(key);
        Ok(())
    }

    fn estimate_usage(&self) -> Result<StorageUsage> {
        let used_bytes = self
            .entries()?
            .iter()
            .map(|(k, v)| entry_size(k, v))
            .sum();
        Ok(StorageUsage {
            used_bytes,
            capacity_bytes: self.capacity,
        })
    }
}
