//! Local cache for market-share and charts data
//!
//! Two independent namespaces over one [`KeyValueStore`]: the weekly
//! market-share dataset (with its version tag) and the charts dataset. The
//! cache is best effort: read failures become misses and write failures are
//! returned for the caller to log, never to abort on.

pub mod backend;
pub mod charts;
pub mod clock;
pub mod market;
pub mod staleness;
pub mod storage;
pub mod store;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::CacheError;

pub use backend::StoreBackend;
pub use clock::SystemClock;
pub use staleness::StalenessPolicy;
pub use storage::SqliteStore;
pub use store::KeyValueStore;
#[cfg(test)]
pub use store::MemoryStore;

use charts::ChartsCache;
use clock::Clock;
use market::MarketShareCache;

/// Keys this crate writes to the store
pub struct CacheKeys;

impl CacheKeys {
    pub const MARKET_SHARE: &'static str = "marketShareData";
    pub const MARKET_SHARE_VERSION: &'static str = "marketShareDataVersion";
    pub const MARKET_SHARE_TIMESTAMP: &'static str = "marketShareDataTimestamp";
    pub const CHARTS: &'static str = "chartsDataCache";
    pub const CHARTS_VERSION: &'static str = "chartsDataVersion";
}

/// Expiry rules for both namespaces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub staleness: StalenessPolicy,
    pub charts_expiry: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            staleness: StalenessPolicy::default(),
            charts_expiry: Duration::hours(6),
        }
    }
}

/// Diagnostics for one cached collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryStats {
    pub size_bytes: usize,
    pub exists: bool,
    pub written_at: Option<DateTime<Utc>>,
}

/// Diagnostics for the whole cache
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub market_share: EntryStats,
    pub charts: EntryStats,
    pub total_size_bytes: usize,
    pub used_bytes: Option<usize>,
    pub capacity_bytes: Option<usize>,
}

/// Both cache namespaces sharing one store
pub struct DashboardCache<S: KeyValueStore> {
    pub market: MarketShareCache<S>,
    pub charts: ChartsCache<S>,
    store: Arc<S>,
}

impl<S: KeyValueStore> DashboardCache<S> {
    pub fn new(store: Arc<S>, settings: CacheSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            market: MarketShareCache::new(store.clone(), settings.staleness, clock.clone()),
            charts: ChartsCache::new(store.clone(), settings.charts_expiry, clock),
            store,
        }
    }

    pub fn clear_all(&self) {
        self.market.clear();
        self.charts.clear();
        log::info!("All caches cleared");
    }

    pub fn stats(&self) -> CacheStats {
        let market_share = self.market.stats();
        let charts = self.charts.stats();
        let usage = match self.store.estimate_usage() {
            Ok(usage) => Some(usage),
            Err(e) => {
                log::warn!("Cannot estimate storage usage: {}", e);
                None
            }
        };

        CacheStats {
            total_size_bytes: market_share.size_bytes + charts.size_bytes,
            market_share,
            charts,
            used_bytes: usage.map(|u| u.used_bytes),
            capacity_bytes: usage.and_then(|u| u.capacity_bytes),
        }
    }
}

/// Read a key, treating store failures as a miss
pub(crate) fn read_key<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Cache read of '{}' failed: {}", key, e);
            None
        }
    }
}

/// Parse a stored payload, reporting failures as [`CacheError::Corrupt`]
pub(crate) fn decode_entry<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T, CacheError> {
    serde_json::from_str(raw).map_err(|e| CacheError::Corrupt {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

pub(crate) fn remove_keys<S: KeyValueStore + ?Sized>(store: &S, keys: &[&str]) {
    for key in keys {
        if let Err(e) = store.remove(key) {
            log::warn!("Failed to remove cache key '{}': {}", key, e);
        }
    }
}

/// Run `write`; on a quota failure `clear` and retry once.
///
/// Any failure that survives leaves the namespace cleared so a half-written
/// payload/timestamp pair is never read back.
pub(crate) fn write_with_recovery<W, C>(
    namespace: &str,
    write: W,
    clear: C,
) -> Result<(), CacheError>
where
    W: Fn() -> Result<(), CacheError>,
    C: Fn(),
{
    match write() {
        Ok(()) => Ok(()),
        Err(err) if err.is_quota() => {
            log::warn!("{} cache is full, clearing and retrying: {}", namespace, err);
            clear();
            write().inspect_err(|err| {
                log::warn!("{} cache still full after clear: {}", namespace, err);
                clear();
            })
        }
        Err(err) => {
            clear();
            Err(err)
        }
    }
}
