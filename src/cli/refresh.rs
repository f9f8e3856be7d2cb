//! Refresh, update check and watch commands

use std::time::Duration;

use colored::Colorize;
use serde_json::json;
use tokio::time::MissedTickBehavior;

use crate::cli::{CommandContext, GlobalOptions, OutputFormat};
use crate::error::Result;
use crate::output::json::format_json;

/// Force-refresh market share and charts
pub async fn refresh(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    ctx.service.refresh_all().await?;
    ctx.service.wait_for_background().await;

    let state = ctx.service.state().read().await;
    let charts = state.charts();
    match ctx.format {
        OutputFormat::Json => {
            let summary = json!({
                "weeks": state.week_count(),
                "currentWeek": state.current_week(),
                "songs": charts.songs.len(),
                "albums": charts.albums.len(),
            });
            println!("{}", format_json(&summary)?);
        }
        OutputFormat::Table => {
            println!(
                "{} Data refreshed: {} weeks of market share, {} songs, {} albums",
                "✓".green(),
                state.week_count(),
                charts.songs.len(),
                charts.albums.len()
            );
        }
    }
    Ok(())
}

/// Reload market share data if the server version changed
pub async fn check_updates(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    ctx.service.publish_cached().await;
    let updated = ctx.service.check_for_updates().await;
    let weeks = ctx.service.state().read().await.week_count();

    match ctx.format {
        OutputFormat::Json => {
            println!(
                "{}",
                format_json(&json!({ "updated": updated, "weeks": weeks }))?
            );
        }
        OutputFormat::Table if updated => {
            println!("{} Updated to latest data ({} weeks)", "✓".green(), weeks);
        }
        OutputFormat::Table => println!("No new data available."),
    }
    Ok(())
}

/// Check for updates every `interval` minutes until Ctrl-C
pub async fn watch(opts: &GlobalOptions, interval: Option<u64>) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let minutes = interval
        .unwrap_or(ctx.config.refresh.interval_minutes)
        .max(1);

    let data = ctx.service.fetch_market_share_data(false).await?;
    println!(
        "Loaded {} weeks. Checking for new data every {} minutes (Ctrl-C to stop).",
        data.len(),
        minutes
    );

    let mut ticker = tokio::time::interval(Duration::from_secs(minutes * 60));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if ctx.service.check_for_updates().await {
                    let weeks = ctx.service.state().read().await.week_count();
                    println!("{} Updated to latest data ({} weeks)", "✓".green(), weeks);
                }
            }
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    log::warn!("Cannot listen for Ctrl-C: {}", e);
                }
                break;
            }
        }
    }

    ctx.service.wait_for_background().await;
    println!("Stopped watching.");
    Ok(())
}
