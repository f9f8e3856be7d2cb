//! labelshare CLI - weekly label market share and music charts

use clap::Parser;

mod cache;
mod charts;
mod cli;
mod client;
mod config;
mod error;
mod market;
mod models;
mod output;
mod service;
mod state;

use cli::charts::ChartsOptions;
use cli::{CacheCommands, Cli, Commands, ConfigCommands, GlobalOptions};
use error::Result;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

/// Warnings only unless `--debug` or `RUST_LOG` says otherwise
fn init_logging(debug: bool) {
    let default_level = if debug { "labelshare=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Market {
            refresh,
            week,
            list_weeks,
        } => cli::market::run(&opts, refresh, week.as_deref(), list_weeks).await,
        Commands::Charts {
            refresh,
            week,
            albums,
            filter,
            limit,
        } => {
            let options = ChartsOptions {
                refresh,
                week,
                albums,
                filter,
                limit,
            };
            cli::charts::run(&opts, &options).await
        }
        Commands::Refresh => cli::refresh::refresh(&opts).await,
        Commands::CheckUpdates => cli::refresh::check_updates(&opts).await,
        Commands::Watch { interval } => cli::refresh::watch(&opts, interval).await,
        Commands::Cache(cmd) => match cmd {
            CacheCommands::Status => cli::cache::status(&opts),
            CacheCommands::Clear { market, charts } => {
                cli::cache::clear(&opts, market, charts).await
            }
            CacheCommands::Path => cli::cache::path(&opts),
        },
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Init { force } => cli::config::init(&opts, force),
            ConfigCommands::Show => cli::config::show(&opts),
        },
        Commands::Version => {
            println!("labelshare version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
