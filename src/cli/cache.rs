//! Cache management commands

use colored::Colorize;
use serde_json::json;

use crate::cli::{CommandContext, GlobalOptions, OutputFormat};
use crate::error::Result;
use crate::models::CacheEntryDisplay;
use crate::output::formatters::format_size;
use crate::output::{json::format_json, table::format_table};

/// Show cache status/statistics
pub fn status(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let cache = ctx.service.cache();
    let stats = cache.stats();
    let location = cache
        .location()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "memory (not persisted)".to_string());

    match ctx.format {
        OutputFormat::Json => {
            let status = json!({
                "location": location,
                "marketShare": {
                    "stats": stats.market_share,
                    "fresh": !cache.market.is_stale(),
                    "version": cache.market.version(),
                },
                "charts": {
                    "stats": stats.charts,
                    "fresh": cache.charts.is_fresh(),
                },
                "totalSizeBytes": stats.total_size_bytes,
                "usedBytes": stats.used_bytes,
                "capacityBytes": stats.capacity_bytes,
            });
            println!("{}", format_json(&status)?);
        }
        OutputFormat::Table => {
            println!("{}", "Cache Status".bold());
            println!("────────────────────────────────────────");
            println!("Location:  {}", location);
            if let Some(version) = cache.market.version() {
                println!("Version:   {}", version);
            }
            let rows = vec![
                CacheEntryDisplay::new("market share", &stats.market_share, !cache.market.is_stale()),
                CacheEntryDisplay::new("charts", &stats.charts, cache.charts.is_fresh()),
            ];
            println!("{}", format_table(&rows));
            match (stats.used_bytes, stats.capacity_bytes) {
                (Some(used), Some(capacity)) => {
                    println!("Usage:     {} of {}", format_size(used), format_size(capacity))
                }
                (Some(used), None) => println!("Usage:     {}", format_size(used)),
                _ => {}
            }
        }
    }

    Ok(())
}

/// Clear one or both cache namespaces
pub async fn clear(opts: &GlobalOptions, market_only: bool, charts_only: bool) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let cache = ctx.service.cache();

    let cleared = match (market_only, charts_only) {
        (true, _) => {
            cache.market.clear();
            vec!["market share"]
        }
        (_, true) => {
            cache.charts.clear();
            vec!["charts"]
        }
        _ => {
            ctx.service.clear_all().await;
            vec!["market share", "charts"]
        }
    };

    match ctx.format {
        OutputFormat::Json => {
            println!(
                "{}",
                format_json(&json!({ "cleared": cleared, "success": true }))?
            );
        }
        OutputFormat::Table => {
            println!("{} Cleared {} cache", "✓".green(), cleared.join(" and "));
        }
    }

    Ok(())
}

/// Print the cache directory
pub fn path(opts: &GlobalOptions) -> Result<()> {
    let dir = CommandContext::cache_dir(opts)?;
    println!("{}", dir.display());
    Ok(())
}
