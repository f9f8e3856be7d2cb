//! Market-share dataset cache
//!
//! Payload, write timestamp and server version live under three separate
//! keys. Reads go through the weekly [`StalenessPolicy`]; a stale or corrupt
//! entry is cleared and reported as a miss.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::clock::Clock;
use super::staleness::StalenessPolicy;
use super::store::KeyValueStore;
use super::{CacheKeys, EntryStats, decode_entry, read_key, remove_keys, write_with_recovery};
use crate::client::models::WeeklyDataset;
use crate::error::CacheError;

pub struct MarketShareCache<S: KeyValueStore> {
    store: Arc<S>,
    policy: StalenessPolicy,
    clock: Arc<dyn Clock>,
}

impl<S: KeyValueStore> MarketShareCache<S> {
    pub fn new(store: Arc<S>, policy: StalenessPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            policy,
            clock,
        }
    }

    /// Cached dataset if fresh and intact.
    ///
    /// A stale entry is cleared before returning `None`, as is one that fails
    /// to parse.
    pub fn get(&self) -> Option<WeeklyDataset> {
        if self.is_stale() {
            if self.exists() {
                log::debug!("Market share cache is stale, clearing");
                self.clear();
            }
            return None;
        }
        self.peek()
    }

    /// Cached dataset regardless of age.
    ///
    /// Only used as a last resort when the network is unavailable. Corrupt
    /// entries are still cleared.
    pub fn peek(&self) -> Option<WeeklyDataset> {
        let raw = read_key(self.store.as_ref(), CacheKeys::MARKET_SHARE)?;
        match decode_entry::<WeeklyDataset>(CacheKeys::MARKET_SHARE, &raw) {
            Ok(data) => {
                log::debug!("Loaded {} weeks of market share data from cache", data.len());
                Some(data)
            }
            Err(e) => {
                log::warn!("{}, discarding market share cache", e);
                self.clear();
                None
            }
        }
    }

    /// Persist a dataset and stamp it with the current time.
    ///
    /// On a quota failure the namespace is cleared and the write retried
    /// once. If that fails too, the namespace is left empty and the error is
    /// returned for the caller to log.
    pub fn set(&self, data: &WeeklyDataset) -> Result<(), CacheError> {
        let payload =
            serde_json::to_string(data).map_err(|e| CacheError::Serialize(e.to_string()))?;

        write_with_recovery(
            "Market share",
            || {
                let stamp = self.clock.now().timestamp_millis().to_string();
                self.store.set(CacheKeys::MARKET_SHARE, &payload)?;
                self.store.set(CacheKeys::MARKET_SHARE_TIMESTAMP, &stamp)
            },
            || self.clear(),
        )?;

        log::debug!("Market share data cached ({} weeks)", data.len());
        Ok(())
    }

    /// Remove payload, timestamp and version
    pub fn clear(&self) {
        remove_keys(
            self.store.as_ref(),
            &[
                CacheKeys::MARKET_SHARE,
                CacheKeys::MARKET_SHARE_VERSION,
                CacheKeys::MARKET_SHARE_TIMESTAMP,
            ],
        );
        log::debug!("Market share cache cleared");
    }

    /// When the payload was last written
    pub fn written_at(&self) -> Option<DateTime<Utc>> {
        let raw = read_key(self.store.as_ref(), CacheKeys::MARKET_SHARE_TIMESTAMP)?;
        let millis = raw.trim().parse::<i64>().ok()?;
        DateTime::from_timestamp_millis(millis)
    }

    pub fn is_stale(&self) -> bool {
        self.policy.is_stale(self.written_at(), self.clock.now())
    }

    fn exists(&self) -> bool {
        read_key(self.store.as_ref(), CacheKeys::MARKET_SHARE).is_some()
    }

    pub fn stats(&self) -> EntryStats {
        let payload = read_key(self.store.as_ref(), CacheKeys::MARKET_SHARE);
        EntryStats {
            size_bytes: payload.as_ref().map(|p| p.len()).unwrap_or(0),
            exists: payload.is_some(),
            written_at: self.written_at(),
        }
    }

    /// Server version the cached dataset corresponds to
    pub fn version(&self) -> Option<String> {
        read_key(self.store.as_ref(), CacheKeys::MARKET_SHARE_VERSION)
    }

    pub fn set_version(&self, version: &str) -> Result<(), CacheError> {
        self.store.set(CacheKeys::MARKET_SHARE_VERSION, version)
    }

    /// True only when a version is stored and equals `server_version`
    pub fn is_version_current(&self, server_version: &str) -> bool {
        self.version().is_some_and(|v| v == server_version)
    }
}
