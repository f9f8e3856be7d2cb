//! Cache status display model

use tabled::Tabled;

use crate::cache::EntryStats;
use crate::output::formatters::{format_size, format_timestamp_local};

#[derive(Debug, Clone, Tabled)]
pub struct CacheEntryDisplay {
    #[tabled(rename = "NAMESPACE")]
    pub namespace: String,

    #[tabled(rename = "CACHED")]
    pub exists: String,

    #[tabled(rename = "SIZE")]
    pub size: String,

    #[tabled(rename = "WRITTEN")]
    pub written_at: String,

    #[tabled(rename = "STATUS")]
    pub status: String,
}

impl CacheEntryDisplay {
    /// `fresh` is whether a read right now would be served from the cache
    pub fn new(namespace: &str, stats: &EntryStats, fresh: bool) -> Self {
        let status = match (stats.exists, fresh) {
            (false, _) => "-",
            (true, true) => "fresh",
            (true, false) => "stale",
        };
        Self {
            namespace: namespace.to_string(),
            exists: if stats.exists { "yes" } else { "no" }.to_string(),
            size: format_size(stats.size_bytes),
            written_at: format_timestamp_local(stats.written_at),
            status: status.to_string(),
        }
    }
}
