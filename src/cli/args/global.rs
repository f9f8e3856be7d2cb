//! Global CLI options shared across all commands

use std::path::PathBuf;

use crate::cli::{Cli, OutputFormat};

/// Global CLI options passed to all command handlers.
///
/// Precedence is CLI flag > environment variable > config file > default.
/// This struct captures the CLI/env layer; config file values are resolved
/// later in `CommandContext`.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub format: OutputFormat,

    /// Custom config file path (defaults to ~/.labelshare/config.yaml)
    pub config: Option<String>,

    /// Market-share endpoint override
    pub market_url: Option<String>,

    /// Charts endpoint override
    pub charts_url: Option<String>,

    /// Directory holding the cache database
    pub cache_dir: Option<PathBuf>,

    /// Keep cached data in memory only for this run
    pub no_cache: bool,
}

impl GlobalOptions {
    /// Create GlobalOptions from a parsed CLI struct.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            config: cli.config.clone(),
            market_url: cli.market_url.clone(),
            charts_url: cli.charts_url.clone(),
            cache_dir: cli.cache_dir.clone(),
            no_cache: cli.no_cache,
        }
    }

    /// Get config path as `Option<&str>`.
    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }
}
