//! Mock data endpoint client for testing
//!
//! Serves canned responses through [`DashboardApi`] and records what was
//! asked of it, so service logic can be tested without a network.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use super::DashboardApi;
use super::models::{RawChartsData, WeeklyDataset};
use crate::error::{ApiError, Result};

/// The endpoint operations, for configuring failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Recent,
    All,
    Version,
    Charts,
}

/// Tracks call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub recent_data: usize,
    pub all_data: usize,
    pub data_version: usize,
    pub charts_data: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.recent_data + self.all_data + self.data_version + self.charts_data
    }
}

/// A captured request for test assertions
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedRequest {
    pub endpoint: Endpoint,
    /// `weeks` for recent-data requests
    pub weeks: Option<usize>,
    /// `week` for charts requests
    pub week: Option<String>,
    pub cache_bust: bool,
}

/// Mock client.
///
/// # Example
/// ```ignore
/// let mock = MockDashboardClient::new()
///     .with_recent(recent)
///     .with_all(full)
///     .with_version("v1");
/// ```
#[derive(Default)]
pub struct MockDashboardClient {
    recent: Arc<Mutex<WeeklyDataset>>,
    all: Arc<Mutex<WeeklyDataset>>,
    version: Arc<Mutex<String>>,
    charts: Arc<Mutex<RawChartsData>>,
    /// Endpoints that fail on every call until cleared
    failing: Arc<Mutex<HashSet<Endpoint>>>,
    /// Holds `all_data` until notified
    all_data_gate: Option<Arc<Notify>>,
    call_count: Arc<Mutex<CallCounts>>,
    captured_requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl MockDashboardClient {
    pub fn new() -> Self {
        Self {
            version: Arc::new(Mutex::new("v1".to_string())),
            ..Self::default()
        }
    }

    pub fn with_recent(self, data: WeeklyDataset) -> Self {
        self.recent.try_lock().map(|mut d| *d = data).ok();
        self
    }

    pub fn with_all(self, data: WeeklyDataset) -> Self {
        self.all.try_lock().map(|mut d| *d = data).ok();
        self
    }

    pub fn with_version(self, version: &str) -> Self {
        self.version
            .try_lock()
            .map(|mut v| *v = version.to_string())
            .ok();
        self
    }

    pub fn with_charts(self, charts: RawChartsData) -> Self {
        self.charts.try_lock().map(|mut c| *c = charts).ok();
        self
    }

    pub fn failing(self, endpoint: Endpoint) -> Self {
        self.failing
            .try_lock()
            .map(|mut f| f.insert(endpoint))
            .ok();
        self
    }

    /// Make `all_data` wait until the returned handle is notified
    pub fn with_all_data_gate(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.all_data_gate = Some(gate.clone());
        (self, gate)
    }

    /// Start failing `endpoint` from now on
    pub async fn fail(&self, endpoint: Endpoint) {
        self.failing.lock().await.insert(endpoint);
    }

    /// Let every endpoint succeed again
    pub async fn recover(&self) {
        self.failing.lock().await.clear();
    }

    pub async fn set_version(&self, version: &str) {
        *self.version.lock().await = version.to_string();
    }

    pub async fn call_counts(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }

    pub async fn captured_requests(&self) -> Vec<CapturedRequest> {
        self.captured_requests.lock().await.clone()
    }

    async fn record(&self, request: CapturedRequest) -> Result<()> {
        {
            let mut counts = self.call_count.lock().await;
            match request.endpoint {
                Endpoint::Recent => counts.recent_data += 1,
                Endpoint::All => counts.all_data += 1,
                Endpoint::Version => counts.data_version += 1,
                Endpoint::Charts => counts.charts_data += 1,
            }
        }

        let endpoint = request.endpoint;
        self.captured_requests.lock().await.push(request);

        if self.failing.lock().await.contains(&endpoint) {
            return Err(ApiError::Network(format!("mock {:?} endpoint unavailable", endpoint)).into());
        }
        Ok(())
    }
}

#[async_trait]
impl DashboardApi for MockDashboardClient {
    async fn recent_data(&self, weeks: usize) -> Result<WeeklyDataset> {
        self.record(CapturedRequest {
            endpoint: Endpoint::Recent,
            weeks: Some(weeks),
            week: None,
            cache_bust: false,
        })
        .await?;
        Ok(self.recent.lock().await.clone())
    }

    async fn all_data(&self) -> Result<WeeklyDataset> {
        if let Some(gate) = &self.all_data_gate {
            gate.notified().await;
        }
        self.record(CapturedRequest {
            endpoint: Endpoint::All,
            weeks: None,
            week: None,
            cache_bust: false,
        })
        .await?;
        Ok(self.all.lock().await.clone())
    }

    async fn data_version(&self) -> Result<String> {
        self.record(CapturedRequest {
            endpoint: Endpoint::Version,
            weeks: None,
            week: None,
            cache_bust: false,
        })
        .await?;
        Ok(self.version.lock().await.clone())
    }

    async fn charts_data(&self, week: Option<&str>, cache_bust: bool) -> Result<RawChartsData> {
        self.record(CapturedRequest {
            endpoint: Endpoint::Charts,
            weeks: None,
            week: week.map(str::to_string),
            cache_bust,
        })
        .await?;
        Ok(self.charts.lock().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::models::WeekRecord;
    use crate::error::Error;

    #[tokio::test]
    async fn test_mock_returns_configured_data() {
        let mut data = WeeklyDataset::new();
        data.insert("01/06/2024".to_string(), WeekRecord::default());
        let mock = MockDashboardClient::new()
            .with_recent(data.clone())
            .with_version("v7");

        assert_eq!(mock.recent_data(8).await.unwrap(), data);
        assert_eq!(mock.data_version().await.unwrap(), "v7");
        assert!(mock.all_data().await.unwrap().is_empty());

        let counts = mock.call_counts().await;
        assert_eq!(counts.recent_data, 1);
        assert_eq!(counts.total(), 3);
    }

    #[tokio::test]
    async fn test_mock_failures_until_recovered() {
        let mock = MockDashboardClient::new().failing(Endpoint::All);

        assert!(matches!(
            mock.all_data().await,
            Err(Error::Api(ApiError::Network(_)))
        ));
        assert!(mock.recent_data(8).await.is_ok());

        mock.recover().await;
        assert!(mock.all_data().await.is_ok());
        assert_eq!(mock.call_counts().await.all_data, 2);
    }

    #[tokio::test]
    async fn test_mock_captures_charts_parameters() {
        let mock = MockDashboardClient::new();
        mock.charts_data(Some("01/13/2024"), true).await.unwrap();

        let requests = mock.captured_requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].week.as_deref(), Some("01/13/2024"));
        assert!(requests[0].cache_bust);
    }
}
