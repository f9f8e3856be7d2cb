//! Remote data endpoint client
//!
//! The market-share and charts data live behind spreadsheet script endpoints
//! that answer `GET ?action=...` with JSON. An `{"error": "..."}` body is a
//! logical failure and surfaces as [`ApiError::Logical`](crate::error::ApiError).

use async_trait::async_trait;

use crate::error::Result;

#[cfg(test)]
pub mod mock;
pub mod models;
pub mod script;

#[cfg(test)]
pub use mock::MockDashboardClient;
pub use models::{RawChartsData, WeeklyDataset};
pub use script::ScriptClient;

/// Operations offered by the data endpoints
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// The most recent `weeks` weeks of market-share data (`getRecentData`)
    async fn recent_data(&self, weeks: usize) -> Result<WeeklyDataset>;

    /// The complete market-share history (`getAllData`)
    async fn all_data(&self) -> Result<WeeklyDataset>;

    /// Version token of the market-share data (`getVersion`)
    async fn data_version(&self) -> Result<String>;

    /// Raw charts for the current week, or for `week` when given
    /// (`getChartsData`).
    ///
    /// `cache_bust` appends a timestamp parameter so intermediaries cannot
    /// serve a stale response.
    async fn charts_data(&self, week: Option<&str>, cache_bust: bool) -> Result<RawChartsData>;
}
