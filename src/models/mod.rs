//! Display models for CLI output

pub mod display;

pub use display::{
    AlbumDisplay, CacheEntryDisplay, LabelShareDisplay, SongDisplay, WeekDisplay,
};
