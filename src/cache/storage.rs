//! SQLite-backed key-value store
//!
//! Persists cache entries between runs in a single `kv` table, with an
//! optional byte ceiling standing in for a browser storage quota.

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::store::{KeyValueStore, StorageUsage, entry_size};
use crate::error::CacheError;

/// Schema version - increment to trigger nuke-and-rebuild
const SCHEMA_VERSION: i32 = 1;

const DB_FILE: &str = "store.db";

type Result<T> = std::result::Result<T, CacheError>;

/// SQLite key-value store
pub struct SqliteStore {
    conn: Mutex<Connection>,
    capacity: Option<usize>,
    db_path: PathBuf,
}

impl SqliteStore {
    /// Get the cache directory path (~/.cache/labelshare on Linux)
    pub fn cache_dir() -> Result<PathBuf> {
        let cache_base = dirs::cache_dir().ok_or(CacheError::NoHome)?;
        Ok(cache_base.join("labelshare"))
    }

    /// Open the store in a specific directory
    pub fn open_at(cache_dir: &Path, capacity: Option<usize>) -> Result<Self> {
        std::fs::create_dir_all(cache_dir)
            .map_err(|e| CacheError::Io(format!("Failed to create cache dir: {}", e)))?;

        let db_path = cache_dir.join(DB_FILE);
        let conn = Connection::open(&db_path)?;

        // Check schema version - nuke if mismatched
        let version: i32 = conn
            .pragma_query_value(None, "user_version", |r| r.get(0))
            .unwrap_or(0);

        if version != 0 && version != SCHEMA_VERSION {
            log::info!(
                "Cache schema version mismatch ({} != {}), rebuilding",
                version,
                SCHEMA_VERSION
            );
            drop(conn);
            Self::nuke(&db_path)?;
            return Self::open_at(cache_dir, capacity);
        }

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                size_bytes INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;

        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

        Ok(Self {
            conn: Mutex::new(conn),
            capacity,
            db_path,
        })
    }

    /// Location of the database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| CacheError::Io("cache connection lock poisoned".to_string()))
    }

    fn nuke(db_path: &Path) -> Result<()> {
        if db_path.exists() {
            std::fs::remove_file(db_path)
                .map_err(|e| CacheError::Io(format!("Failed to remove cache DB: {}", e)))?;
        }
        Ok(())
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let size = entry_size(key, value);

        if let Some(capacity) = self.capacity {
            let others: i64 = tx.query_row(
                "SELECT COALESCE(SUM(size_bytes), 0) FROM kv WHERE key != ?1",
                [key],
                |r| r.get(0),
            )?;
            let needed = others as usize + size;
            if needed > capacity {
                return Err(CacheError::QuotaExceeded { needed, capacity });
            }
        }

        tx.execute(
            "INSERT OR REPLACE INTO kv (key, value, size_bytes, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![key, value, size as i64, Utc::now().timestamp_millis()],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.conn()?.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(())
    }

    fn estimate_usage(&self) -> Result<StorageUsage> {
        let used: i64 = self.conn()?.query_row(
            "SELECT COALESCE(SUM(size_bytes), 0) FROM kv",
            [],
            |r| r.get(0),
        )?;
        Ok(StorageUsage {
            used_bytes: used as usize,
            capacity_bytes: self.capacity,
        })
    }
}
