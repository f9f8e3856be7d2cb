//! Command execution context
//!
//! Loads configuration, applies CLI overrides and wires the data service to
//! the endpoint client and the local store.

use std::path::PathBuf;
use std::sync::Arc;

use crate::cache::{DashboardCache, SqliteStore, StoreBackend, SystemClock};
use crate::cli::{GlobalOptions, OutputFormat};
use crate::client::ScriptClient;
use crate::config::Config;
use crate::error::Result;
use crate::service::DataService;
use crate::state::AppState;

/// The service as the CLI runs it
pub type Service = DataService<ScriptClient, StoreBackend>;

/// Context for command execution: effective config, service and output format
pub struct CommandContext {
    pub config: Config,
    pub service: Service,
    pub format: OutputFormat,
}

impl CommandContext {
    /// Build the context from global options.
    ///
    /// # Errors
    /// Returns an error if the config cannot be loaded or is invalid.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let config = Self::effective_config(opts)?;

        let store = Self::open_store(opts, &config)?;
        let cache = DashboardCache::new(
            Arc::new(store),
            config.cache_settings()?,
            Arc::new(SystemClock),
        );
        let client = ScriptClient::new(
            config.endpoints.market_share_url.clone(),
            config.endpoints.charts_url.clone(),
        )?;

        let service = DataService::new(Arc::new(client), Arc::new(cache), AppState::shared())
            .with_recent_weeks(config.cache.recent_weeks);

        Ok(Self {
            config,
            service,
            format: opts.format,
        })
    }

    /// Config file values with CLI/env endpoint overrides applied
    pub fn effective_config(opts: &GlobalOptions) -> Result<Config> {
        let mut config = Config::load_at(opts.config_ref())?;
        if let Some(url) = &opts.market_url {
            config.endpoints.market_share_url = url.clone();
        }
        if let Some(url) = &opts.charts_url {
            config.endpoints.charts_url = url.clone();
        }
        Ok(config)
    }

    /// Directory holding the cache database
    pub fn cache_dir(opts: &GlobalOptions) -> Result<PathBuf> {
        match &opts.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(SqliteStore::cache_dir()?),
        }
    }

    fn open_store(opts: &GlobalOptions, config: &Config) -> Result<StoreBackend> {
        let capacity = config.cache.quota_bytes;
        if opts.no_cache {
            log::debug!("Cache disabled, keeping data in memory");
            return Ok(StoreBackend::Memory(StoreBackend::memory(capacity)));
        }
        let dir = Self::cache_dir(opts)?;
        Ok(StoreBackend::open_or_memory(&dir, capacity))
    }
}
