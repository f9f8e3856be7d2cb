//! Market share command

use colored::Colorize;

use crate::cli::{CommandContext, GlobalOptions, OutputFormat};
use crate::error::{Error, Result};
use crate::market::MarketSummary;
use crate::models::{LabelShareDisplay, WeekDisplay};
use crate::output::formatters::{format_change, format_optional_number};
use crate::output::{json, print_rows, table};

/// Show one week's label shares, or the list of loaded weeks
pub async fn run(
    opts: &GlobalOptions,
    refresh: bool,
    week: Option<&str>,
    list_weeks: bool,
) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    ctx.service.fetch_market_share_data(refresh).await?;
    // Let the full history land (and be cached) before reading
    ctx.service.wait_for_background().await;

    let mut state = ctx.service.state().write().await;

    if list_weeks {
        let rows: Vec<WeekDisplay> = state
            .weekly_data()
            .iter()
            .rev()
            .map(|(week, record)| WeekDisplay::new(week, record))
            .collect();
        return print_rows(&rows, &state.sorted_weeks(), ctx.format);
    }

    if let Some(week) = week
        && !state.select_week(week)
    {
        return Err(Error::Other(format!(
            "Week {} is not in the loaded data (see --list-weeks)",
            week
        )));
    }

    let analytics = state.analytics();
    let (Some(current_week), Some(current)) = (state.current_week(), analytics.current.as_ref())
    else {
        println!("No market share data available.");
        return Ok(());
    };
    let summary = MarketSummary::new(current_week, current, analytics.previous.as_ref());

    match ctx.format {
        OutputFormat::Json => println!("{}", json::format_json(&summary)?),
        OutputFormat::Table => {
            println!("{}\n", summary.headline().bold());
            let rows: Vec<LabelShareDisplay> =
                summary.labels.iter().map(LabelShareDisplay::from).collect();
            println!("{}", table::format_table(&rows));
            println!(
                "\nTotal volume:    {} ({} WoW)",
                format_optional_number(summary.total_volume),
                format_change(summary.total_volume_change, 1)
            );
            println!(
                "Total streaming: {} ({} WoW)",
                format_optional_number(summary.total_streaming),
                format_change(summary.total_streaming_change, 1)
            );
            println!(
                "{}",
                format!("{} weeks loaded", analytics.total_weeks).dimmed()
            );
        }
    }

    Ok(())
}
