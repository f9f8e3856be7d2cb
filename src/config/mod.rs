//! Configuration management for labelshare

use std::path::{Path, PathBuf};

use chrono::{Duration, Weekday};
use serde::{Deserialize, Serialize};

use crate::cache::{CacheSettings, StalenessPolicy};
use crate::error::{ConfigError, Result};

/// Placeholder endpoints until real deployment URLs are configured
const DEFAULT_MARKET_SHARE_URL: &str = "https://script.google.com/macros/s/market-share/exec";
const DEFAULT_CHARTS_URL: &str = "https://script.google.com/macros/s/charts/exec";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub endpoints: Endpoints,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub refresh: RefreshConfig,
}

/// Script endpoint URLs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoints {
    #[serde(default = "default_market_share_url")]
    pub market_share_url: String,

    #[serde(default = "default_charts_url")]
    pub charts_url: String,
}

fn default_market_share_url() -> String {
    DEFAULT_MARKET_SHARE_URL.to_string()
}

fn default_charts_url() -> String {
    DEFAULT_CHARTS_URL.to_string()
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            market_share_url: default_market_share_url(),
            charts_url: default_charts_url(),
        }
    }
}

/// Cache behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Weeks requested for the fast first load
    pub recent_weeks: usize,

    /// Market-share data older than this is discarded
    pub stale_after_days: i64,

    /// Day on which last week's market-share data is discarded
    pub reset_weekday: String,

    pub charts_expiry_hours: i64,

    /// Ceiling for the local store; writes beyond it are rejected
    pub quota_bytes: Option<usize>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            recent_weeks: 8,
            stale_after_days: 7,
            reset_weekday: "Monday".to_string(),
            charts_expiry_hours: 6,
            quota_bytes: Some(5 * 1024 * 1024),
        }
    }
}

/// Background refresh for `watch`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub interval_minutes: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 30,
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".labelshare").join("config.yaml"))
    }

    /// Resolve an explicit path, falling back to the default location
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(path) => Ok(PathBuf::from(path)),
            None => Self::default_path(),
        }
    }

    /// Load from `path`, or from the default location.
    ///
    /// A missing default file yields the defaults; a missing explicit file
    /// is an error.
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(Path::new(path)),
            None => {
                let path = Self::default_path()?;
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    log::debug!("No config at {}, using defaults", path.display());
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()).into());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;
        std::fs::write(path, contents)?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.cache.reset_weekday()?;
        if self.cache.recent_weeks == 0 {
            return Err(ConfigError::Invalid("cache.recent_weeks must be at least 1".into()).into());
        }
        self.cache.stale_after()?;
        self.cache.charts_expiry()?;
        if self.refresh.interval_minutes == 0 {
            return Err(
                ConfigError::Invalid("refresh.interval_minutes must be at least 1".into()).into(),
            );
        }
        Ok(())
    }

    /// Expiry rules for the cache layer
    pub fn cache_settings(&self) -> Result<CacheSettings> {
        Ok(CacheSettings {
            staleness: StalenessPolicy::new(
                self.cache.reset_weekday()?,
                self.cache.stale_after()?,
            ),
            charts_expiry: self.cache.charts_expiry()?,
        })
    }
}

impl CacheConfig {
    /// Age ceiling for market-share data
    pub fn stale_after(&self) -> Result<Duration> {
        positive_duration(
            "cache.stale_after_days",
            self.stale_after_days,
            Duration::try_days,
        )
    }

    pub fn charts_expiry(&self) -> Result<Duration> {
        positive_duration(
            "cache.charts_expiry_hours",
            self.charts_expiry_hours,
            Duration::try_hours,
        )
    }

    pub fn reset_weekday(&self) -> Result<Weekday> {
        self.reset_weekday.parse::<Weekday>().map_err(|_| {
            ConfigError::Invalid(format!(
                "cache.reset_weekday: '{}' is not a weekday",
                self.reset_weekday
            ))
            .into()
        })
    }
}

fn positive_duration(
    field: &str,
    value: i64,
    to_duration: fn(i64) -> Option<Duration>,
) -> Result<Duration> {
    if value <= 0 {
        return Err(ConfigError::Invalid(format!("{} must be positive", field)).into());
    }
    to_duration(value).ok_or_else(|| {
        ConfigError::Invalid(format!("{} is out of range: {}", field, value)).into()
    })
}
