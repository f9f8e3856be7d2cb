//! Songs and albums chart normalization
//!
//! Turns raw sheet rows into ranked chart entries: numeric cells are coerced
//! leniently, labels are mapped to display names, movement against last
//! week is derived, and rows without a usable rank or artist are dropped.

pub mod labels;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::models::{RawChartEntry, RawChartsData};
pub use labels::map_label_name;

/// Artist placeholder for rows with no artist; such rows are dropped
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
const UNKNOWN_TITLE: &str = "Unknown Title";

/// Trend of a ranked item against the previous week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Movement {
    New,
    Up,
    Down,
    Same,
}

impl Movement {
    /// Classify `current` against `last_week`; a last-week rank of 0 means
    /// the item was not charting.
    pub fn classify(current: i64, last_week: i64) -> Self {
        if last_week == 0 {
            Movement::New
        } else if current < last_week {
            Movement::Up
        } else if current > last_week {
            Movement::Down
        } else {
            Movement::Same
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Movement::New => "new",
            Movement::Up => "up",
            Movement::Down => "down",
            Movement::Same => "same",
        }
    }
}

impl std::fmt::Display for Movement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongEntry {
    pub rank: i64,
    pub artist: String,
    pub title: String,
    pub label: String,
    pub streams: i64,
    pub last_week: i64,
    pub two_weeks_ago: i64,
    pub percent_change: f64,
    pub weeks_on_chart: i64,
    pub rtd_streams: i64,
    pub movement: Movement,
    pub is_new: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumEntry {
    pub rank: i64,
    pub artist: String,
    pub title: String,
    pub label: String,
    pub sales: i64,
    pub streams: i64,
    pub last_week: i64,
    pub peak_position: i64,
    pub percent_change: f64,
    pub weeks_on_chart: i64,
    pub album_sales: i64,
    pub total_streams: i64,
    pub movement: Movement,
    pub is_new: bool,
}

/// Normalized songs and albums charts
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartsDataset {
    pub songs: Vec<SongEntry>,
    pub albums: Vec<AlbumEntry>,
}

impl ChartsDataset {
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty() && self.albums.is_empty()
    }
}

/// Shared view used to filter and order chart rows
trait Ranked {
    fn rank(&self) -> i64;
    fn artist(&self) -> &str;
}

impl Ranked for SongEntry {
    fn rank(&self) -> i64 {
        self.rank
    }
    fn artist(&self) -> &str {
        &self.artist
    }
}

impl Ranked for AlbumEntry {
    fn rank(&self) -> i64 {
        self.rank
    }
    fn artist(&self) -> &str {
        &self.artist
    }
}

/// Normalize both charts of a raw response
pub fn process_charts_data(raw: &RawChartsData) -> ChartsDataset {
    let songs = process_songs(&raw.songs);
    let albums = process_albums(&raw.albums);
    log::debug!(
        "Processed {} songs and {} albums",
        songs.len(),
        albums.len()
    );
    ChartsDataset { songs, albums }
}

pub fn process_songs(rows: &[RawChartEntry]) -> Vec<SongEntry> {
    normalize(rows, |index, row| {
        let fallback_rank = index as i64 + 1;
        let rank = or_default(parse_int(row.this_week_rank.as_ref()), fallback_rank);
        let last_week = or_default(parse_int(row.last_week_rank.as_ref()), 0);
        SongEntry {
            rank,
            artist: text_or(row.artist.as_ref(), UNKNOWN_ARTIST),
            title: text_or(row.title.as_ref(), UNKNOWN_TITLE),
            label: map_label_name(cell_text(row.label.as_ref()).as_deref()),
            streams: or_default(parse_int(row.streams.as_ref()), 0),
            last_week,
            two_weeks_ago: or_default(parse_int(row.two_week_rank.as_ref()), 0),
            percent_change: parse_float(row.percent_change.as_ref()).unwrap_or(0.0),
            weeks_on_chart: or_default(parse_int(row.weeks_on.as_ref()), 1),
            rtd_streams: or_default(parse_int(row.rtd_streams.as_ref()), 0),
            movement: Movement::classify(rank, last_week),
            is_new: last_week == 0,
        }
    })
}

pub fn process_albums(rows: &[RawChartEntry]) -> Vec<AlbumEntry> {
    normalize(rows, |index, row| {
        let fallback_rank = index as i64 + 1;
        let rank = or_default(parse_int(row.this_week_rank.as_ref()), fallback_rank);
        let last_week = or_default(parse_int(row.last_week_rank.as_ref()), 0);
        AlbumEntry {
            rank,
            artist: text_or(row.artist.as_ref(), UNKNOWN_ARTIST),
            title: text_or(row.title.as_ref(), UNKNOWN_TITLE),
            label: map_label_name(cell_text(row.label.as_ref()).as_deref()),
            sales: or_default(parse_int(row.activity.as_ref()), 0),
            streams: or_default(parse_int(row.streams.as_ref()), 0),
            last_week,
            peak_position: or_default(parse_int(row.peak_rank.as_ref()), fallback_rank),
            percent_change: parse_float(row.percent_change.as_ref()).unwrap_or(0.0),
            weeks_on_chart: or_default(parse_int(row.weeks_on.as_ref()), 1),
            album_sales: or_default(parse_int(row.album_sales.as_ref()), 0),
            total_streams: or_default(parse_int(row.total_streams.as_ref()), 0),
            movement: Movement::classify(rank, last_week),
            is_new: last_week == 0,
        }
    })
}

fn normalize<T, F>(rows: &[RawChartEntry], build: F) -> Vec<T>
where
    T: Ranked,
    F: Fn(usize, &RawChartEntry) -> T,
{
    let mut items: Vec<T> = rows
        .iter()
        .enumerate()
        .map(|(index, row)| build(index, row))
        .filter(|item| item.rank() > 0 && item.artist() != UNKNOWN_ARTIST)
        .collect();
    items.sort_by_key(|item| item.rank());
    items
}

/// Zero and missing both fall back, matching how the sheet leaves cells blank.
fn or_default(value: Option<i64>, default: i64) -> i64 {
    value.filter(|v| *v != 0).unwrap_or(default)
}

/// Integer value of a cell: numbers are truncated, strings contribute their
/// leading integer with thousands separators ignored.
pub(crate) fn parse_int(cell: Option<&Value>) -> Option<i64> {
    match cell? {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
            let (sign, digits) = match cleaned.strip_prefix('-') {
                Some(rest) => (-1, rest),
                None => (1, cleaned.strip_prefix('+').unwrap_or(&cleaned)),
            };
            let end = digits
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(digits.len());
            digits[..end].parse::<i64>().ok().map(|v| sign * v)
        }
        _ => None,
    }
}

/// Float value of a cell; strings contribute their leading number, so
/// `"12.5%"` reads as `12.5`.
pub(crate) fn parse_float(cell: Option<&Value>) -> Option<f64> {
    match cell? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
            let prefix_len = cleaned
                .find(|c: char| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')))
                .unwrap_or(cleaned.len());
            (1..=prefix_len)
                .rev()
                .find_map(|len| cleaned[..len].parse::<f64>().ok())
                .filter(|f| f.is_finite())
        }
        _ => None,
    }
}

fn cell_text(cell: Option<&Value>) -> Option<String> {
    match cell? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text_or(cell: Option<&Value>, placeholder: &str) -> String {
    cell_text(cell).unwrap_or_else(|| placeholder.to_string())
}
