//! Market-share display models

use tabled::Tabled;

use crate::market::LabelShare;
use crate::output::formatters::{format_change, format_optional_number};

#[derive(Debug, Clone, Tabled)]
pub struct LabelShareDisplay {
    #[tabled(rename = "LABEL")]
    pub label: String,

    #[tabled(rename = "SHARE")]
    pub share: String,

    #[tabled(rename = "VOLUME")]
    pub volume: String,

    /// Week-over-week change in percentage points
    #[tabled(rename = "WOW")]
    pub change: String,
}

impl From<&LabelShare> for LabelShareDisplay {
    fn from(share: &LabelShare) -> Self {
        Self {
            label: share.label.clone(),
            share: format!("{:.1}%", share.percentage),
            volume: format_optional_number(share.volume),
            change: format_change(share.change, 2),
        }
    }
}

/// One loaded week, for `market --list-weeks`
#[derive(Debug, Clone, Tabled)]
pub struct WeekDisplay {
    #[tabled(rename = "WEEK")]
    pub week: String,

    #[tabled(rename = "LABELS")]
    pub labels: usize,

    #[tabled(rename = "TOTAL VOLUME")]
    pub total_volume: String,

    #[tabled(rename = "STREAMING")]
    pub total_streaming: String,
}

impl WeekDisplay {
    pub fn new(week: &str, record: &crate::client::models::WeekRecord) -> Self {
        Self {
            week: week.to_string(),
            labels: record.market_shares.len(),
            total_volume: format_optional_number(
                record.total_market_share_volume.as_ref().map(|v| v.value),
            ),
            total_streaming: format_optional_number(record.total_streaming),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::models::{MarketShareInfo, VolumeTotal, WeekRecord};

    #[test]
    fn test_label_share_display() {
        let display = LabelShareDisplay::from(&LabelShare {
            label: "Provident".to_string(),
            percentage: 31.54,
            volume: Some(120_000.0),
            change: Some(1.5),
        });

        assert_eq!(display.share, "31.5%");
        assert_eq!(display.volume, "120.0K");
        assert_eq!(display.change, "+1.50%");
    }

    #[test]
    fn test_week_display() {
        let mut record = WeekRecord {
            total_market_share_volume: Some(VolumeTotal { value: 380_000.0 }),
            ..WeekRecord::default()
        };
        record
            .market_shares
            .insert("CCMG".to_string(), MarketShareInfo::default());

        let display = WeekDisplay::new("01/06/2024", &record);
        assert_eq!(display.labels, 1);
        assert_eq!(display.total_volume, "380.0K");
        assert_eq!(display.total_streaming, "N/A");
    }
}
