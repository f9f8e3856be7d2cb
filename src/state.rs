//! Application state fed by the data service
//!
//! Holds the published market-share and charts datasets plus the small amount
//! of view state the CLI needs (selected week, load phase).

use std::ops::Bound;
use std::sync::Arc;

use clap::ValueEnum;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::charts::{AlbumEntry, ChartsDataset, Movement, SongEntry};
use crate::client::models::{WeekRecord, WeeklyDataset};

/// State shared between the data service, its background tasks and the CLI
pub type SharedState = Arc<RwLock<AppState>>;

/// Songs that have charted this many weeks or fewer count as fresh
const FRESH_MAX_WEEKS: i64 = 52;

/// Progress of the market-share load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPhase {
    #[default]
    Empty,
    LoadingRecent,
    RecentReady,
    LoadingFull,
    FullReady,
    CheckingVersion,
}

/// Chart row filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartFilter {
    #[default]
    All,
    /// Songs on the chart for a year or less (albums ignore this filter)
    Fresh,
    New,
    /// Moved up or gained streams
    Increases,
    /// Moved down or lost streams
    Decreases,
}

/// Summary of what is currently loaded
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub current: Option<WeekRecord>,
    pub previous: Option<WeekRecord>,
    pub total_weeks: usize,
    pub has_charts_data: bool,
}

#[derive(Debug, Default)]
pub struct AppState {
    weekly_data: WeeklyDataset,
    current_week: Option<String>,
    charts: ChartsDataset,
    phase: LoadPhase,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedState {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Replace the weekly dataset and point the current week at its latest key
    pub fn set_weekly_data(&mut self, data: WeeklyDataset) {
        self.weekly_data = data;
        if let Some(latest) = self.weekly_data.keys().next_back() {
            log::debug!("Current week set to {}", latest);
            self.current_week = Some(latest.clone());
        }
    }

    pub fn weekly_data(&self) -> &WeeklyDataset {
        &self.weekly_data
    }

    pub fn week_count(&self) -> usize {
        self.weekly_data.len()
    }

    pub fn current_week(&self) -> Option<&str> {
        self.current_week.as_deref()
    }

    /// Point the current week at `week`; false if it is not loaded
    pub fn select_week(&mut self, week: &str) -> bool {
        if self.weekly_data.contains_key(week) {
            self.current_week = Some(week.to_string());
            true
        } else {
            false
        }
    }

    /// Week ids in ascending order
    pub fn sorted_weeks(&self) -> Vec<&str> {
        self.weekly_data.keys().map(String::as_str).collect()
    }

    pub fn current_week_data(&self) -> Option<&WeekRecord> {
        self.current_week
            .as_deref()
            .and_then(|week| self.weekly_data.get(week))
    }

    /// The week before the current one
    pub fn previous_week(&self) -> Option<&str> {
        let current = self.current_week.as_deref()?;
        self.weekly_data
            .range::<str, _>((Bound::Unbounded, Bound::Excluded(current)))
            .next_back()
            .map(|(week, _)| week.as_str())
    }

    pub fn previous_week_data(&self) -> Option<&WeekRecord> {
        self.previous_week()
            .and_then(|week| self.weekly_data.get(week))
    }

    pub fn set_charts_data(&mut self, charts: ChartsDataset) {
        self.charts = charts;
    }

    pub fn charts(&self) -> &ChartsDataset {
        &self.charts
    }

    pub fn filtered_songs(&self, filter: ChartFilter) -> Vec<&SongEntry> {
        self.charts
            .songs
            .iter()
            .filter(|song| match filter {
                ChartFilter::All => true,
                ChartFilter::Fresh => song.weeks_on_chart <= FRESH_MAX_WEEKS,
                ChartFilter::New => song.is_new,
                ChartFilter::Increases => {
                    song.movement == Movement::Up || song.percent_change > 0.0
                }
                ChartFilter::Decreases => {
                    song.movement == Movement::Down || song.percent_change < 0.0
                }
            })
            .collect()
    }

    pub fn filtered_albums(&self, filter: ChartFilter) -> Vec<&AlbumEntry> {
        self.charts
            .albums
            .iter()
            .filter(|album| match filter {
                ChartFilter::All | ChartFilter::Fresh => true,
                ChartFilter::New => album.is_new,
                ChartFilter::Increases => {
                    album.movement == Movement::Up || album.percent_change > 0.0
                }
                ChartFilter::Decreases => {
                    album.movement == Movement::Down || album.percent_change < 0.0
                }
            })
            .collect()
    }

    pub fn analytics(&self) -> Analytics {
        Analytics {
            current: self.current_week_data().cloned(),
            previous: self.previous_week_data().cloned(),
            total_weeks: self.weekly_data.len(),
            has_charts_data: !self.charts.is_empty(),
        }
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: LoadPhase) {
        if self.phase != phase {
            log::debug!("Load phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::models::MarketShareInfo;

    fn record(percentage: f64) -> WeekRecord {
        let mut record = WeekRecord::default();
        record.market_shares.insert(
            "Provident".to_string(),
            MarketShareInfo {
                percentage,
                volume: None,
            },
        );
        record
    }

    fn state_with_weeks(weeks: &[&str]) -> AppState {
        let mut state = AppState::new();
        state.set_weekly_data(
            weeks
                .iter()
                .enumerate()
                .map(|(i, w)| (w.to_string(), record(i as f64)))
                .collect(),
        );
        state
    }

    fn song(rank: i64, movement: Movement, percent_change: f64, weeks_on_chart: i64) -> SongEntry {
        SongEntry {
            rank,
            artist: format!("Artist {}", rank),
            title: format!("Song {}", rank),
            label: "Independent".to_string(),
            streams: 100,
            last_week: 0,
            two_weeks_ago: 0,
            percent_change,
            weeks_on_chart,
            rtd_streams: 0,
            movement,
            is_new: movement == Movement::New,
        }
    }

    #[test]
    fn test_current_week_is_greatest_key() {
        let state = state_with_weeks(&["01/13/2024", "01/06/2024", "01/20/2024"]);
        assert_eq!(state.current_week(), Some("01/20/2024"));
        assert_eq!(
            state.sorted_weeks(),
            vec!["01/06/2024", "01/13/2024", "01/20/2024"]
        );
    }

    #[test]
    fn test_previous_week() {
        let mut state = state_with_weeks(&["01/06/2024", "01/13/2024", "01/20/2024"]);
        assert_eq!(state.previous_week(), Some("01/13/2024"));
        assert_eq!(state.previous_week_data(), Some(&record(1.0)));

        assert!(state.select_week("01/06/2024"));
        assert_eq!(state.previous_week(), None);
    }

    #[test]
    fn test_current_week_across_year_boundary_is_lexical() {
        // Keys are MM/DD/YYYY strings, so December sorts after January
        let state = state_with_weeks(&["12/30/2023", "01/06/2024"]);
        assert_eq!(state.current_week(), Some("12/30/2023"));
        assert_eq!(state.previous_week(), Some("01/06/2024"));
    }

    #[test]
    fn test_select_unknown_week_is_rejected() {
        let mut state = state_with_weeks(&["01/06/2024"]);
        assert!(!state.select_week("12/30/2023"));
        assert_eq!(state.current_week(), Some("01/06/2024"));
    }

    #[test]
    fn test_empty_dataset_keeps_previous_current_week() {
        let mut state = state_with_weeks(&["01/06/2024"]);
        state.set_weekly_data(WeeklyDataset::new());
        assert_eq!(state.current_week(), Some("01/06/2024"));
        assert!(state.current_week_data().is_none());
    }

    #[test]
    fn test_song_filters() {
        let mut state = AppState::new();
        state.set_charts_data(ChartsDataset {
            songs: vec![
                song(1, Movement::Up, -2.0, 10),
                song(2, Movement::New, 0.0, 1),
                song(3, Movement::Down, 4.0, 80),
                song(4, Movement::Same, 0.0, 60),
            ],
            albums: vec![],
        });

        let ranks = |filter| {
            state
                .filtered_songs(filter)
                .iter()
                .map(|s| s.rank)
                .collect::<Vec<_>>()
        };
        assert_eq!(ranks(ChartFilter::All), vec![1, 2, 3, 4]);
        assert_eq!(ranks(ChartFilter::Fresh), vec![1, 2]);
        assert_eq!(ranks(ChartFilter::New), vec![2]);
        assert_eq!(ranks(ChartFilter::Increases), vec![1, 3]);
        assert_eq!(ranks(ChartFilter::Decreases), vec![1, 3]);
    }

    #[test]
    fn test_analytics_and_reset() {
        let mut state = state_with_weeks(&["01/06/2024", "01/13/2024"]);
        state.set_phase(LoadPhase::FullReady);

        let analytics = state.analytics();
        assert_eq!(analytics.total_weeks, 2);
        assert_eq!(analytics.current, Some(record(1.0)));
        assert_eq!(analytics.previous, Some(record(0.0)));
        assert!(!analytics.has_charts_data);

        state.reset();
        assert_eq!(state.week_count(), 0);
        assert_eq!(state.current_week(), None);
        assert_eq!(state.phase(), LoadPhase::Empty);
    }
}
