//! HTTP client for the spreadsheet script endpoints

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::models::{RawChartsData, VersionInfo, WeeklyDataset};
use super::DashboardApi;
use crate::error::{ApiError, Result};

/// Script endpoints are slow to cold-start
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Courtesy limit towards the script host
const RATE_LIMIT_PER_SECOND: NonZeroU32 = NonZeroU32::new(6).unwrap();

/// Client for the market-share and charts endpoints
pub struct ScriptClient {
    http: HttpClient,
    market_url: String,
    charts_url: String,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl ScriptClient {
    /// Create a client for the given endpoint URLs
    pub fn new(market_url: impl Into<String>, charts_url: impl Into<String>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_second(
            RATE_LIMIT_PER_SECOND,
        )));

        Ok(Self {
            http,
            market_url: market_url.into(),
            charts_url: charts_url.into(),
            rate_limiter,
        })
    }

    /// GET `url` with `query` and return the JSON body.
    ///
    /// Non-2xx statuses and bodies carrying an `error` field are errors.
    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        self.rate_limiter.until_ready().await;

        log::debug!("GET {} {:?}", url, query);
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
            }
            .into());
        }

        let body: Value = response.json().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse response: {}", e))
        })?;

        if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
            let message = error
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(ApiError::Logical(message).into());
        }

        Ok(body)
    }

    fn decode<T: DeserializeOwned>(body: Value, action: &str) -> Result<T> {
        serde_json::from_value(body).map_err(|e| {
            ApiError::InvalidResponse(format!("Unexpected {} response: {}", action, e)).into()
        })
    }
}

fn action(name: &str) -> (&'static str, String) {
    ("action", name.to_string())
}

#[async_trait]
impl DashboardApi for ScriptClient {
    async fn recent_data(&self, weeks: usize) -> Result<WeeklyDataset> {
        let query = [action("getRecentData"), ("weeks", weeks.to_string())];
        let body = self.get_json(&self.market_url, &query).await?;
        Self::decode(body, "getRecentData")
    }

    async fn all_data(&self) -> Result<WeeklyDataset> {
        let body = self
            .get_json(&self.market_url, &[action("getAllData")])
            .await?;
        Self::decode(body, "getAllData")
    }

    async fn data_version(&self) -> Result<String> {
        let body = self
            .get_json(&self.market_url, &[action("getVersion")])
            .await?;
        let info: VersionInfo = Self::decode(body, "getVersion")?;
        info.token().ok_or_else(|| {
            ApiError::InvalidResponse("getVersion response has no version".to_string()).into()
        })
    }

    async fn charts_data(&self, week: Option<&str>, cache_bust: bool) -> Result<RawChartsData> {
        let mut query = vec![action("getChartsData")];
        if let Some(week) = week {
            query.push(("week", week.to_string()));
        }
        if cache_bust {
            query.push(("_t", Utc::now().timestamp_millis().to_string()));
        }

        let body = self.get_json(&self.charts_url, &query).await?;
        Self::decode(body, "getChartsData")
    }
}
