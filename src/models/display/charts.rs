//! Chart row display models

use tabled::Tabled;

use super::common::truncate_string;
use crate::charts::{AlbumEntry, Movement, SongEntry};
use crate::output::formatters::{format_change, format_number};

const MAX_TEXT_WIDTH: usize = 32;

/// Last-week column: blank for new entries
fn last_week_cell(last_week: i64) -> String {
    if last_week > 0 {
        last_week.to_string()
    } else {
        "-".to_string()
    }
}

fn movement_cell(movement: Movement) -> String {
    match movement {
        Movement::New => "NEW".to_string(),
        Movement::Up => "▲".to_string(),
        Movement::Down => "▼".to_string(),
        Movement::Same => "=".to_string(),
    }
}

#[derive(Debug, Clone, Tabled)]
pub struct SongDisplay {
    #[tabled(rename = "#")]
    pub rank: i64,

    #[tabled(rename = "LW")]
    pub last_week: String,

    #[tabled(rename = "")]
    pub movement: String,

    #[tabled(rename = "ARTIST")]
    pub artist: String,

    #[tabled(rename = "TITLE")]
    pub title: String,

    #[tabled(rename = "LABEL")]
    pub label: String,

    #[tabled(rename = "STREAMS")]
    pub streams: String,

    #[tabled(rename = "CHANGE")]
    pub percent_change: String,

    #[tabled(rename = "WKS")]
    pub weeks_on_chart: i64,
}

impl From<&SongEntry> for SongDisplay {
    fn from(song: &SongEntry) -> Self {
        Self {
            rank: song.rank,
            last_week: last_week_cell(song.last_week),
            movement: movement_cell(song.movement),
            artist: truncate_string(&song.artist, MAX_TEXT_WIDTH),
            title: truncate_string(&song.title, MAX_TEXT_WIDTH),
            label: song.label.clone(),
            streams: format_number(song.streams as f64),
            percent_change: format_change(Some(song.percent_change), 1),
            weeks_on_chart: song.weeks_on_chart,
        }
    }
}

#[derive(Debug, Clone, Tabled)]
pub struct AlbumDisplay {
    #[tabled(rename = "#")]
    pub rank: i64,

    #[tabled(rename = "LW")]
    pub last_week: String,

    #[tabled(rename = "PEAK")]
    pub peak_position: i64,

    #[tabled(rename = "")]
    pub movement: String,

    #[tabled(rename = "ARTIST")]
    pub artist: String,

    #[tabled(rename = "TITLE")]
    pub title: String,

    #[tabled(rename = "LABEL")]
    pub label: String,

    #[tabled(rename = "ACTIVITY")]
    pub sales: String,

    #[tabled(rename = "STREAMS")]
    pub streams: String,

    #[tabled(rename = "CHANGE")]
    pub percent_change: String,
}

impl From<&AlbumEntry> for AlbumDisplay {
    fn from(album: &AlbumEntry) -> Self {
        Self {
            rank: album.rank,
            last_week: last_week_cell(album.last_week),
            peak_position: album.peak_position,
            movement: movement_cell(album.movement),
            artist: truncate_string(&album.artist, MAX_TEXT_WIDTH),
            title: truncate_string(&album.title, MAX_TEXT_WIDTH),
            label: album.label.clone(),
            sales: format_number(album.sales as f64),
            streams: format_number(album.streams as f64),
            percent_change: format_change(Some(album.percent_change), 1),
        }
    }
}
