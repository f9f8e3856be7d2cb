//! Charts command

use crate::cli::{CommandContext, GlobalOptions};
use crate::error::Result;
use crate::models::{AlbumDisplay, SongDisplay};
use crate::output::print_rows;
use crate::state::{AppState, ChartFilter};

/// Options for the charts command
#[derive(Debug, Clone, Default)]
pub struct ChartsOptions {
    pub refresh: bool,
    pub week: Option<String>,
    pub albums: bool,
    pub filter: ChartFilter,
    pub limit: Option<usize>,
}

/// Show the songs or albums chart
pub async fn run(opts: &GlobalOptions, options: &ChartsOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;

    let charts = match &options.week {
        Some(week) => ctx.service.fetch_charts_data_for_week(week).await?,
        None => ctx.service.fetch_charts_data(options.refresh).await?,
    };

    let mut view = AppState::new();
    view.set_charts_data(charts);
    let limit = options.limit.unwrap_or(usize::MAX);

    if options.albums {
        if options.filter == ChartFilter::Fresh {
            log::warn!("The fresh filter applies to songs only; showing all albums");
        }
        let albums: Vec<_> = view
            .filtered_albums(options.filter)
            .into_iter()
            .take(limit)
            .collect();
        let rows: Vec<AlbumDisplay> = albums.iter().map(|a| AlbumDisplay::from(*a)).collect();
        print_rows(&rows, &albums, ctx.format)?;
    } else {
        let songs: Vec<_> = view
            .filtered_songs(options.filter)
            .into_iter()
            .take(limit)
            .collect();
        let rows: Vec<SongDisplay> = songs.iter().map(|s| SongDisplay::from(*s)).collect();
        print_rows(&rows, &songs, ctx.format)?;
    }

    Ok(())
}
