//! Charts loading

use super::DataService;
use crate::cache::KeyValueStore;
use crate::charts::{ChartsDataset, process_charts_data};
use crate::client::DashboardApi;
use crate::error::Result;

impl<C, S> DataService<C, S>
where
    C: DashboardApi + 'static,
    S: KeyValueStore + 'static,
{
    /// Load the current charts, cache first unless `force`.
    ///
    /// A forced load clears the charts cache and sends a cache-busting
    /// parameter. Failures are returned; there is no stale fallback.
    pub async fn fetch_charts_data(&self, force: bool) -> Result<ChartsDataset> {
        if force {
            self.cache.charts.clear();
        } else if let Some(cached) = self.cache.charts.get() {
            self.state.write().await.set_charts_data(cached.clone());
            return Ok(cached);
        }

        let raw = self
            .client
            .charts_data(None, force)
            .await
            .inspect_err(|e| log::error!("Error fetching charts data: {}", e))?;

        let charts = process_charts_data(&raw);
        log::info!(
            "Loaded {} songs, {} albums",
            charts.songs.len(),
            charts.albums.len()
        );

        self.state.write().await.set_charts_data(charts.clone());
        if let Err(e) = self.cache.charts.set(&charts) {
            log::warn!("Failed to cache charts data: {}", e);
        }
        Ok(charts)
    }

    /// Charts for a specific week. Not cached and not published.
    pub async fn fetch_charts_data_for_week(&self, week: &str) -> Result<ChartsDataset> {
        let raw = self
            .client
            .charts_data(Some(week), false)
            .await
            .inspect_err(|e| log::error!("Error fetching charts data for {}: {}", week, e))?;
        Ok(process_charts_data(&raw))
    }
}
