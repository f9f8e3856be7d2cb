//! Display model implementations for table output
//!
//! Display models turn loaded data into rows with CLI-friendly column names.
//! JSON output serializes the underlying data instead.

mod cache;
mod charts;
mod common;
mod market;

pub use cache::CacheEntryDisplay;
pub use charts::{AlbumDisplay, SongDisplay};
pub use market::{LabelShareDisplay, WeekDisplay};
