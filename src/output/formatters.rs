//! Reusable formatting utilities for CLI output

use chrono::{DateTime, Utc};

/// Compact a count for tables: `1.2B`, `3.4M`, `5.6K`, or as-is below 1000
pub fn format_number(value: f64) -> String {
    if value >= 1e9 {
        format!("{:.1}B", value / 1e9)
    } else if value >= 1e6 {
        format!("{:.1}M", value / 1e6)
    } else if value >= 1e3 {
        format!("{:.1}K", value / 1e3)
    } else {
        value.to_string()
    }
}

/// [`format_number`] for optional values, `N/A` when absent
pub fn format_optional_number(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_else(|| "N/A".to_string())
}

/// Signed percentage such as `+1.25%`, or `N/A`
pub fn format_change(change: Option<f64>, decimals: usize) -> String {
    match change {
        Some(change) if change > 0.0 => format!("+{:.*}%", decimals, change),
        Some(change) => format!("{:.*}%", decimals, change),
        None => "N/A".to_string(),
    }
}

/// Format bytes as human-readable size
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;
    const GB: usize = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Local date/time, or `never` when absent
pub fn format_timestamp_local(timestamp: Option<DateTime<Utc>>) -> String {
    match timestamp {
        Some(ts) => ts
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        None => "never".to_string(),
    }
}
