//! Charts dataset cache
//!
//! Charts refresh several times a day, so they follow a plain age limit
//! rather than the weekly market-share rule. The write timestamp travels
//! inside the payload.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::clock::Clock;
use super::store::KeyValueStore;
use super::{
    CacheKeys, EntryStats, decode_entry, read_key, remove_keys, write_with_recovery,
};
use crate::charts::ChartsDataset;
use crate::error::CacheError;

/// Stored form of the charts payload
#[derive(Debug, Serialize, Deserialize)]
struct ChartsCacheEntry {
    charts: ChartsDataset,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct EntryStamp {
    timestamp: DateTime<Utc>,
}

pub struct ChartsCache<S: KeyValueStore> {
    store: Arc<S>,
    expiry: Duration,
    clock: Arc<dyn Clock>,
}

impl<S: KeyValueStore> ChartsCache<S> {
    pub fn new(store: Arc<S>, expiry: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            expiry,
            clock,
        }
    }

    /// Cached charts if younger than the expiry window
    pub fn get(&self) -> Option<ChartsDataset> {
        let raw = read_key(self.store.as_ref(), CacheKeys::CHARTS)?;

        let entry = match decode_entry::<ChartsCacheEntry>(CacheKeys::CHARTS, &raw) {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("{}, discarding charts cache", e);
                self.clear();
                return None;
            }
        };

        let age = self.clock.now() - entry.timestamp;
        if age > self.expiry {
            log::debug!(
                "Charts cache expired ({} min old, limit {} h)",
                age.num_minutes(),
                self.expiry.num_hours()
            );
            self.clear();
            return None;
        }

        log::debug!("Loading charts data from cache");
        Some(entry.charts)
    }

    /// Persist charts with the current time embedded.
    ///
    /// Same quota recovery as the market-share cache: clear, retry once,
    /// otherwise leave the namespace empty and return the error.
    pub fn set(&self, charts: &ChartsDataset) -> Result<(), CacheError> {
        let entry = ChartsCacheEntry {
            charts: charts.clone(),
            timestamp: self.clock.now(),
        };
        let payload =
            serde_json::to_string(&entry).map_err(|e| CacheError::Serialize(e.to_string()))?;

        write_with_recovery(
            "Charts",
            || self.store.set(CacheKeys::CHARTS, &payload),
            || self.clear(),
        )?;

        log::debug!("Charts data cached successfully");
        Ok(())
    }

    pub fn clear(&self) {
        remove_keys(
            self.store.as_ref(),
            &[CacheKeys::CHARTS, CacheKeys::CHARTS_VERSION],
        );
        log::debug!("Charts cache cleared");
    }

    pub fn written_at(&self) -> Option<DateTime<Utc>> {
        let raw = read_key(self.store.as_ref(), CacheKeys::CHARTS)?;
        serde_json::from_str::<EntryStamp>(&raw)
            .ok()
            .map(|stamp| stamp.timestamp)
    }

    /// Whether a stored entry is still within the expiry window
    pub fn is_fresh(&self) -> bool {
        self.written_at()
            .is_some_and(|at| self.clock.now() - at <= self.expiry)
    }

    pub fn stats(&self) -> EntryStats {
        let payload = read_key(self.store.as_ref(), CacheKeys::CHARTS);
        EntryStats {
            size_bytes: payload.as_ref().map(|p| p.len()).unwrap_or(0),
            exists: payload.is_some(),
            written_at: self.written_at(),
        }
    }
}
