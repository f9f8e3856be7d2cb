//! Progressive data loading
//!
//! [`DataService`] publishes a small recent window of market-share data as
//! soon as it arrives, then loads the full history in the background and
//! merges it in. Cached data is served first when fresh, with a background
//! version check to pick up server-side updates.

mod charts;
pub mod tasks;

use std::sync::Arc;

use crate::cache::{DashboardCache, KeyValueStore};
use crate::client::DashboardApi;
use crate::client::models::WeeklyDataset;
use crate::error::{ApiError, Result};
use crate::state::{LoadPhase, SharedState};

pub use tasks::BackgroundTasks;

/// Number of weeks fetched for the fast first load
pub const DEFAULT_RECENT_WEEKS: usize = 8;

/// Fetch orchestrator over an endpoint client and a cache
pub struct DataService<C, S>
where
    C: DashboardApi + 'static,
    S: KeyValueStore + 'static,
{
    client: Arc<C>,
    cache: Arc<DashboardCache<S>>,
    state: SharedState,
    recent_weeks: usize,
    tasks: BackgroundTasks,
}

impl<C, S> Clone for DataService<C, S>
where
    C: DashboardApi + 'static,
    S: KeyValueStore + 'static,
{
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            cache: self.cache.clone(),
            state: self.state.clone(),
            recent_weeks: self.recent_weeks,
            tasks: self.tasks.clone(),
        }
    }
}

impl<C, S> DataService<C, S>
where
    C: DashboardApi + 'static,
    S: KeyValueStore + 'static,
{
    pub fn new(client: Arc<C>, cache: Arc<DashboardCache<S>>, state: SharedState) -> Self {
        Self {
            client,
            cache,
            state,
            recent_weeks: DEFAULT_RECENT_WEEKS,
            tasks: BackgroundTasks::new(),
        }
    }

    /// Size of the recent window requested on a cache miss
    pub fn with_recent_weeks(mut self, weeks: usize) -> Self {
        self.recent_weeks = weeks.max(1);
        self
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn cache(&self) -> &DashboardCache<S> {
        &self.cache
    }

    /// Load market-share data, cache first unless `force`.
    ///
    /// A fresh cache hit is published and returned immediately, and a
    /// version check is spawned. Otherwise the recent window is fetched,
    /// published and persisted, and the full history is loaded in the
    /// background. If the fetch fails, any readable cached data is used even
    /// when stale; the error surfaces only when there is none.
    pub async fn fetch_market_share_data(&self, force: bool) -> Result<WeeklyDataset> {
        // Stale data is cleared by a normal read, so keep a copy for fallback
        let fallback = self.cache.market.peek();

        if !force
            && let Some(cached) = self.cache.market.get()
            && !cached.is_empty()
        {
            log::info!("Loaded {} weeks from cache", cached.len());
            self.publish(cached.clone(), LoadPhase::FullReady).await;
            self.check_for_updates_in_background().await;
            return Ok(cached);
        }

        let previous_phase = self.phase().await;
        self.set_phase(LoadPhase::LoadingRecent).await;

        match self.fetch_recent().await {
            Ok(recent) => {
                log::info!("Loaded recent {} weeks", recent.len());
                self.publish(recent.clone(), LoadPhase::RecentReady).await;
                self.persist(&recent);
                self.load_remaining_in_background().await;
                Ok(recent)
            }
            Err(e) => {
                log::error!("Error fetching market share data: {}", e);
                match fallback.filter(|data| !data.is_empty()) {
                    Some(cached) => {
                        log::warn!("Using cached data as fallback ({} weeks)", cached.len());
                        self.publish(cached.clone(), LoadPhase::FullReady).await;
                        Ok(cached)
                    }
                    None => {
                        self.set_phase(previous_phase).await;
                        Err(e)
                    }
                }
            }
        }
    }

    async fn fetch_recent(&self) -> Result<WeeklyDataset> {
        log::debug!("Fetching recent {} weeks", self.recent_weeks);
        let data = self.client.recent_data(self.recent_weeks).await?;
        if data.is_empty() {
            return Err(ApiError::EmptyPayload("No recent data received".to_string()).into());
        }
        Ok(data)
    }

    /// Spawn [`load_remaining`](Self::load_remaining)
    pub async fn load_remaining_in_background(&self) {
        let service = self.clone();
        self.tasks
            .spawn("load remaining weeks", async move {
                service.load_remaining().await;
            })
            .await;
    }

    /// Fetch the full history and merge it into the published dataset.
    ///
    /// The merge happens only when the full set has strictly more weeks than
    /// what is published; full-history records win on overlapping weeks.
    /// Returns whether anything was merged. Failures are logged only.
    pub async fn load_remaining(&self) -> bool {
        log::debug!("Loading historical data in background");
        self.set_phase(LoadPhase::LoadingFull).await;

        let full = match self.client.all_data().await {
            Ok(full) => full,
            Err(e) => {
                log::warn!("Background loading failed: {}", e);
                self.set_phase(LoadPhase::RecentReady).await;
                return false;
            }
        };

        let merged = {
            let mut state = self.state.write().await;
            state.set_phase(LoadPhase::FullReady);
            if full.len() <= state.week_count() {
                log::debug!(
                    "Full dataset has {} weeks, {} already loaded; keeping current data",
                    full.len(),
                    state.week_count()
                );
                None
            } else {
                let mut merged = state.weekly_data().clone();
                merged.extend(full);
                state.set_weekly_data(merged.clone());
                Some(merged)
            }
        };

        match merged {
            Some(merged) => {
                self.persist(&merged);
                log::info!("Background loading complete: {} weeks", merged.len());
                true
            }
            None => false,
        }
    }

    /// Spawn [`check_for_updates`](Self::check_for_updates)
    pub async fn check_for_updates_in_background(&self) {
        let service = self.clone();
        self.tasks
            .spawn("check for updates", async move {
                service.check_for_updates().await;
            })
            .await;
    }

    /// Compare the server version with the cached one and reload on change.
    ///
    /// On a new version the full history replaces the published dataset and
    /// the version is recorded once the data is persisted. Returns whether
    /// new data was loaded. Failures are logged only.
    pub async fn check_for_updates(&self) -> bool {
        let previous_phase = self.phase().await;
        self.set_phase(LoadPhase::CheckingVersion).await;

        let updated = self.try_update().await;
        let phase = if updated {
            LoadPhase::FullReady
        } else {
            previous_phase
        };
        self.set_phase(phase).await;
        updated
    }

    async fn try_update(&self) -> bool {
        let server_version = match self.client.data_version().await {
            Ok(version) => version,
            Err(e) => {
                log::warn!("Update check failed: {}", e);
                return false;
            }
        };

        if self.cache.market.is_version_current(&server_version) {
            log::debug!("Market share data is current ({})", server_version);
            return false;
        }

        log::info!("New data available ({}), updating", server_version);
        let data = match self.client.all_data().await {
            Ok(data) if !data.is_empty() => data,
            Ok(_) => {
                log::warn!("Update check failed: server returned no weeks");
                return false;
            }
            Err(e) => {
                log::warn!("Update check failed: {}", e);
                return false;
            }
        };

        log::info!("Updated to latest data ({} weeks)", data.len());
        self.state.write().await.set_weekly_data(data.clone());
        if self.persist(&data)
            && let Err(e) = self.cache.market.set_version(&server_version)
        {
            log::warn!("Failed to store data version: {}", e);
        }
        true
    }

    /// Force-refresh market share and charts together.
    ///
    /// A charts failure is only logged; a market-share failure is returned.
    pub async fn refresh_all(&self) -> Result<WeeklyDataset> {
        let (market, charts) = futures::join!(
            self.fetch_market_share_data(true),
            self.fetch_charts_data(true)
        );
        if let Err(e) = charts {
            log::warn!("Charts refresh failed: {}", e);
        }
        market
    }

    /// Publish whatever market-share data is cached, fresh or not.
    ///
    /// Returns the number of weeks published.
    pub async fn publish_cached(&self) -> usize {
        match self.cache.market.peek().filter(|data| !data.is_empty()) {
            Some(cached) => {
                let weeks = cached.len();
                self.publish(cached, LoadPhase::FullReady).await;
                weeks
            }
            None => 0,
        }
    }

    /// Drop both cache namespaces and everything published
    pub async fn clear_all(&self) {
        self.wait_for_background().await;
        self.cache.clear_all();
        self.state.write().await.reset();
    }

    /// Block until all background loads and checks have finished
    pub async fn wait_for_background(&self) {
        let pending = self.tasks.pending().await;
        if pending > 0 {
            log::debug!("Waiting for {} background task(s)", pending);
        }
        self.tasks.wait().await;
    }

    pub async fn phase(&self) -> LoadPhase {
        self.state.read().await.phase()
    }

    async fn set_phase(&self, phase: LoadPhase) {
        self.state.write().await.set_phase(phase);
    }

    async fn publish(&self, data: WeeklyDataset, phase: LoadPhase) {
        let mut state = self.state.write().await;
        state.set_weekly_data(data);
        state.set_phase(phase);
    }

    /// Write to the cache, logging failures; true if the data was stored
    fn persist(&self, data: &WeeklyDataset) -> bool {
        match self.cache.market.set(data) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to cache market share data: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::FixedClock;
    use crate::cache::{CacheKeys, CacheSettings, MemoryStore};
    use crate::client::mock::Endpoint;
    use crate::client::models::{MarketShareInfo, WeekRecord};
    use crate::client::MockDashboardClient;
    use crate::error::Error;
    use crate::state::AppState;
    use chrono::{Duration, TimeZone, Utc};

    type TestService = DataService<MockDashboardClient, MemoryStore>;

    fn dataset(weeks: &[&str], percentage: f64) -> WeeklyDataset {
        weeks
            .iter()
            .map(|week| {
                let mut record = WeekRecord::default();
                record.market_shares.insert(
                    "Provident".to_string(),
                    MarketShareInfo {
                        percentage,
                        volume: None,
                    },
                );
                (week.to_string(), record)
            })
            .collect()
    }

    struct Harness {
        service: TestService,
        client: Arc<MockDashboardClient>,
        store: Arc<MemoryStore>,
        clock: Arc<FixedClock>,
    }

    fn harness(client: MockDashboardClient) -> Harness {
        let client = Arc::new(client);
        let store = Arc::new(MemoryStore::new());
        // Wednesday
        let clock = Arc::new(FixedClock::at(
            Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap(),
        ));
        let cache = Arc::new(DashboardCache::new(
            store.clone(),
            CacheSettings::default(),
            clock.clone(),
        ));
        let service = DataService::new(client.clone(), cache, AppState::shared());
        Harness {
            service,
            client,
            store,
            clock,
        }
    }

    #[tokio::test]
    async fn test_empty_cache_loads_recent_then_merges_full() {
        let recent = dataset(&["01/20/2024", "01/27/2024"], 20.0);
        let full = dataset(&["01/06/2024", "01/13/2024", "01/20/2024", "01/27/2024"], 25.0);
        let (client, gate) = MockDashboardClient::new()
            .with_recent(recent.clone())
            .with_all(full.clone())
            .with_all_data_gate();
        let h = harness(client);

        let returned = h.service.fetch_market_share_data(false).await.unwrap();
        assert_eq!(returned, recent);
        {
            let state = h.service.state().read().await;
            assert_eq!(state.week_count(), 2);
            assert_eq!(state.current_week(), Some("01/27/2024"));
        }

        gate.notify_one();
        h.service.wait_for_background().await;

        let state = h.service.state().read().await;
        assert_eq!(state.week_count(), 4);
        assert_eq!(state.current_week(), Some("01/27/2024"));
        assert_eq!(state.phase(), LoadPhase::FullReady);
        // Full history wins on overlapping weeks
        assert_eq!(
            state.weekly_data()["01/27/2024"].market_shares["Provident"].percentage,
            25.0
        );
        drop(state);

        assert_eq!(h.service.cache().market.peek(), Some(full));
        let requests = h.client.captured_requests().await;
        assert_eq!(requests[0].weeks, Some(DEFAULT_RECENT_WEEKS));
    }

    #[tokio::test]
    async fn test_smaller_full_set_is_not_merged() {
        let recent = dataset(&["01/06/2024", "01/13/2024"], 20.0);
        let client = MockDashboardClient::new()
            .with_recent(recent.clone())
            .with_all(dataset(&["01/13/2024"], 99.0));
        let h = harness(client);

        h.service.fetch_market_share_data(false).await.unwrap();
        h.service.wait_for_background().await;

        let state = h.service.state().read().await;
        assert_eq!(state.weekly_data(), &recent);
        assert_eq!(h.client.call_counts().await.all_data, 1);
    }

    #[tokio::test]
    async fn test_equal_size_full_set_is_not_merged() {
        let recent = dataset(&["01/06/2024", "01/13/2024"], 20.0);
        let client = MockDashboardClient::new()
            .with_recent(recent.clone())
            .with_all(dataset(&["01/06/2024", "01/13/2024"], 99.0));
        let h = harness(client);

        h.service.fetch_market_share_data(false).await.unwrap();
        h.service.wait_for_background().await;

        assert_eq!(h.service.state().read().await.weekly_data(), &recent);
    }

    #[tokio::test]
    async fn test_fresh_cache_is_served_and_version_checked() {
        let cached = dataset(&["01/06/2024"], 20.0);
        let h = harness(MockDashboardClient::new().with_version("v1"));
        h.service.cache().market.set(&cached).unwrap();
        h.service.cache().market.set_version("v1").unwrap();

        let returned = h.service.fetch_market_share_data(false).await.unwrap();
        assert_eq!(returned, cached);

        h.service.wait_for_background().await;
        let counts = h.client.call_counts().await;
        assert_eq!(counts.recent_data, 0);
        assert_eq!(counts.data_version, 1);
        assert_eq!(counts.all_data, 0);
        assert_eq!(h.service.phase().await, LoadPhase::FullReady);
    }

    #[tokio::test]
    async fn test_version_change_reloads_full_history() {
        let cached = dataset(&["01/06/2024"], 20.0);
        let fresh = dataset(&["01/06/2024", "01/13/2024"], 30.0);
        let h = harness(
            MockDashboardClient::new()
                .with_version("v2")
                .with_all(fresh.clone()),
        );
        h.service.cache().market.set(&cached).unwrap();
        h.service.cache().market.set_version("v1").unwrap();

        h.service.fetch_market_share_data(false).await.unwrap();
        h.service.wait_for_background().await;

        assert_eq!(h.service.state().read().await.weekly_data(), &fresh);
        assert_eq!(h.service.cache().market.peek(), Some(fresh));
        assert!(h.service.cache().market.is_version_current("v2"));
    }

    #[tokio::test]
    async fn test_update_check_failures_are_swallowed() {
        let h = harness(MockDashboardClient::new().failing(Endpoint::Version));
        assert!(!h.service.check_for_updates().await);

        h.client.recover().await;
        h.client.fail(Endpoint::All).await;
        assert!(!h.service.check_for_updates().await);
        assert_eq!(h.service.phase().await, LoadPhase::Empty);
        assert_eq!(h.service.cache().market.version(), None);
    }

    #[tokio::test]
    async fn test_forced_refresh_skips_fresh_cache() {
        let recent = dataset(&["01/13/2024"], 40.0);
        let h = harness(MockDashboardClient::new().with_recent(recent.clone()));
        h.service
            .cache()
            .market
            .set(&dataset(&["01/06/2024"], 20.0))
            .unwrap();

        let returned = h.service.fetch_market_share_data(true).await.unwrap();
        h.service.wait_for_background().await;

        assert_eq!(returned, recent);
        assert_eq!(h.client.call_counts().await.recent_data, 1);
    }

    #[tokio::test]
    async fn test_network_failure_falls_back_to_stale_cache() {
        let cached = dataset(&["01/06/2024"], 20.0);
        let h = harness(MockDashboardClient::new().failing(Endpoint::Recent));
        h.service.cache().market.set(&cached).unwrap();
        h.clock.advance(Duration::days(10));

        let returned = h.service.fetch_market_share_data(false).await.unwrap();

        assert_eq!(returned, cached);
        assert_eq!(h.service.state().read().await.weekly_data(), &cached);
    }

    #[tokio::test]
    async fn test_logical_failure_is_handled_like_transport_failure() {
        // Empty recent window counts as a failed fetch
        let cached = dataset(&["01/06/2024"], 20.0);
        let h = harness(MockDashboardClient::new());
        h.service.cache().market.set(&cached).unwrap();

        let returned = h.service.fetch_market_share_data(true).await.unwrap();
        assert_eq!(returned, cached);
    }

    #[tokio::test]
    async fn test_error_when_network_and_cache_unavailable() {
        let h = harness(MockDashboardClient::new().failing(Endpoint::Recent));

        let err = h.service.fetch_market_share_data(false).await.unwrap_err();

        assert!(matches!(err, Error::Api(ApiError::Network(_))));
        assert_eq!(h.service.phase().await, LoadPhase::Empty);
        assert_eq!(h.service.state().read().await.week_count(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_cache_is_not_used_as_fallback() {
        let h = harness(MockDashboardClient::new().failing(Endpoint::Recent));
        h.store.insert_raw(CacheKeys::MARKET_SHARE, "{broken");

        assert!(h.service.fetch_market_share_data(false).await.is_err());
        assert!(!h.store.contains(CacheKeys::MARKET_SHARE));
    }

    #[tokio::test]
    async fn test_background_failure_keeps_recent_data() {
        let recent = dataset(&["01/06/2024", "01/13/2024"], 20.0);
        let h = harness(
            MockDashboardClient::new()
                .with_recent(recent.clone())
                .failing(Endpoint::All),
        );

        let returned = h.service.fetch_market_share_data(false).await.unwrap();
        h.service.wait_for_background().await;

        assert_eq!(returned, recent);
        let state = h.service.state().read().await;
        assert_eq!(state.weekly_data(), &recent);
        assert_eq!(state.phase(), LoadPhase::RecentReady);
        drop(state);
        assert_eq!(h.service.cache().market.peek(), Some(recent));
    }

    #[tokio::test]
    async fn test_quota_failure_does_not_fail_the_fetch() {
        let recent = dataset(&["01/13/2024"], 20.0);
        let h = harness(MockDashboardClient::new().with_recent(recent.clone()));
        h.store.reject_next_writes(2);

        let returned = h.service.fetch_market_share_data(false).await.unwrap();
        assert_eq!(returned, recent);
        h.service.wait_for_background().await;
    }

    #[tokio::test]
    async fn test_current_version_keeps_cached_weeks_published() {
        let cached = dataset(&["01/06/2024", "01/13/2024"], 20.0);
        let h = harness(MockDashboardClient::new().with_version("v1"));
        h.service.cache().market.set(&cached).unwrap();
        h.service.cache().market.set_version("v1").unwrap();

        assert_eq!(h.service.publish_cached().await, 2);
        assert!(!h.service.check_for_updates().await);

        let state = h.service.state().read().await;
        assert_eq!(state.week_count(), 2);
        assert_eq!(state.phase(), LoadPhase::FullReady);
        assert_eq!(h.client.call_counts().await.all_data, 0);
    }

    #[tokio::test]
    async fn test_publish_cached_with_empty_cache() {
        let h = harness(MockDashboardClient::new());
        assert_eq!(h.service.publish_cached().await, 0);
        assert_eq!(h.service.phase().await, LoadPhase::Empty);
    }

    #[tokio::test]
    async fn test_clear_all_forgets_cached_and_published_data() {
        let h = harness(
            MockDashboardClient::new()
                .with_recent(dataset(&["01/06/2024", "01/13/2024"], 20.0))
                .with_all(dataset(&["01/06/2024", "01/13/2024"], 20.0)),
        );
        h.service.fetch_market_share_data(false).await.unwrap();

        h.service.clear_all().await;

        assert!(!h.store.contains(CacheKeys::MARKET_SHARE));
        let state = h.service.state().read().await;
        assert_eq!(state.week_count(), 0);
        assert_eq!(state.current_week(), None);
        assert_eq!(state.phase(), LoadPhase::Empty);
    }

    #[tokio::test]
    async fn test_recent_window_size_is_configurable() {
        let h = harness(
            MockDashboardClient::new().with_recent(dataset(&["01/13/2024"], 20.0)),
        );
        let service = h.service.clone().with_recent_weeks(4);

        service.fetch_market_share_data(false).await.unwrap();
        service.wait_for_background().await;

        let requests = h.client.captured_requests().await;
        assert_eq!(requests[0].weeks, Some(4));
    }
}
