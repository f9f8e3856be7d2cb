//! Weekly staleness rule for market-share data
//!
//! Market-share data is published once a week. Anything written before
//! midnight on the reset weekday is discarded, and nothing older than the
//! absolute ceiling is ever trusted, even if the app never ran on a reset day.

use chrono::{DateTime, Datelike, Duration, Utc, Weekday};

/// Decides whether previously stored market-share data must be discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessPolicy {
    /// Day on which the weekly dataset is expected to refresh
    pub reset_weekday: Weekday,
    /// Absolute age ceiling
    pub max_age: Duration,
}

impl Default for StalenessPolicy {
    fn default() -> Self {
        Self {
            reset_weekday: Weekday::Mon,
            max_age: Duration::days(7),
        }
    }
}

impl StalenessPolicy {
    pub fn new(reset_weekday: Weekday, max_age: Duration) -> Self {
        Self {
            reset_weekday,
            max_age,
        }
    }

    /// Whether data written at `last_written` is stale at `now`.
    ///
    /// Day boundaries are UTC.
    pub fn is_stale(&self, last_written: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        let Some(last_written) = last_written else {
            return true;
        };

        if now.weekday() == self.reset_weekday {
            let midnight = now.date_naive().and_time(chrono::NaiveTime::MIN).and_utc();
            if last_written < midnight {
                log::debug!("Weekly reset day, cache written before midnight is stale");
                return true;
            }
        }

        if now - last_written > self.max_age {
            log::debug!("Cache older than {} days", self.max_age.num_days());
            return true;
        }

        false
    }
}
