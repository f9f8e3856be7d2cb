//! CLI command definitions and handlers

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod cache;
pub mod charts;
pub mod config;
pub mod context;
pub mod market;
pub mod refresh;

pub use args::{GlobalOptions, OutputFormat};
pub use context::CommandContext;

use crate::state::ChartFilter;

/// labelshare - weekly label market share and music charts from the command line
#[derive(Parser, Debug)]
#[command(name = "labelshare")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, json)
    #[arg(
        long,
        global = true,
        env = "LABELSHARE_FORMAT",
        default_value = "table",
        hide_env = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "LABELSHARE_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Market-share endpoint URL
    #[arg(long, global = true, env = "LABELSHARE_MARKET_URL", hide_env = true)]
    pub market_url: Option<String>,

    /// Charts endpoint URL
    #[arg(long, global = true, env = "LABELSHARE_CHARTS_URL", hide_env = true)]
    pub charts_url: Option<String>,

    /// Directory for the local cache database
    #[arg(long, global = true, env = "LABELSHARE_CACHE_DIR", hide_env = true)]
    pub cache_dir: Option<PathBuf>,

    /// Do not read or write the local cache
    #[arg(long, global = true, env = "LABELSHARE_NO_CACHE", hide_env = true)]
    pub no_cache: bool,

    /// Enable debug logging
    #[arg(long, global = true, env = "LABELSHARE_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show label market share for the latest (or a given) week
    Market {
        /// Skip the cache and fetch fresh data
        #[arg(long)]
        refresh: bool,

        /// Week to show (e.g. 01/13/2024)
        #[arg(long)]
        week: Option<String>,

        /// List the loaded weeks instead of one week's shares
        #[arg(long, conflicts_with = "week")]
        list_weeks: bool,
    },

    /// Show the songs (or albums) chart
    Charts {
        /// Skip the cache and fetch fresh data
        #[arg(long)]
        refresh: bool,

        /// Fetch a specific chart week (not cached)
        #[arg(long, conflicts_with = "refresh")]
        week: Option<String>,

        /// Show the albums chart instead of songs
        #[arg(long)]
        albums: bool,

        /// Filter chart rows
        #[arg(long, value_enum, default_value = "all")]
        filter: ChartFilter,

        /// Show at most this many rows
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Force-refresh market share and charts data
    Refresh,

    /// Reload market share data if the server has a newer version
    CheckUpdates,

    /// Keep checking for new data until interrupted
    Watch {
        /// Minutes between checks (defaults to refresh.interval_minutes)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Manage the local cache
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Display version information
    Version,
}

/// Cache management subcommands
#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show cache statistics
    Status,
    /// Clear cached data (both namespaces unless one is selected)
    Clear {
        /// Only clear market share data
        #[arg(long, conflicts_with = "charts")]
        market: bool,

        /// Only clear charts data
        #[arg(long)]
        charts: bool,
    },
    /// Print the cache directory
    Path,
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a configuration file with default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration
    Show,
}
