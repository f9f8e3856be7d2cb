//! Wire types returned by the data endpoints

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Week id (e.g. `"01/13/2024"`) to that week's record.
///
/// Keys sort lexically, so the last key is the most recent week.
pub type WeeklyDataset = BTreeMap<String, WeekRecord>;

/// Market share figures for one week
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekRecord {
    /// Label name to its share of the market
    #[serde(default)]
    pub market_shares: BTreeMap<String, MarketShareInfo>,

    /// Total volume across all labels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_market_share_volume: Option<VolumeTotal>,

    /// Total streaming count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_streaming: Option<f64>,
}

/// One label's share for a week
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarketShareInfo {
    pub percentage: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VolumeTotal {
    pub value: f64,
}

/// Response of `getVersion`
#[derive(Debug, Clone, Deserialize)]
pub struct VersionInfo {
    /// Opaque token; some deployments send a number
    #[serde(default)]
    pub version: Value,
}

impl VersionInfo {
    /// The version token as a string, if present
    pub fn token(&self) -> Option<String> {
        match &self.version {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Raw response of `getChartsData`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawChartsData {
    #[serde(default)]
    pub songs: Vec<RawChartEntry>,

    #[serde(default)]
    pub albums: Vec<RawChartEntry>,
}

/// A chart row as the sheet exports it.
///
/// Cells arrive as numbers, numeric strings, empty strings or not at all
/// (a title like `1989` comes through as a number), so every column is kept
/// as raw JSON and coerced during normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChartEntry {
    #[serde(default)]
    pub this_week_rank: Option<Value>,
    #[serde(default)]
    pub last_week_rank: Option<Value>,
    #[serde(default)]
    pub two_week_rank: Option<Value>,
    #[serde(default)]
    pub peak_rank: Option<Value>,
    #[serde(default)]
    pub artist: Option<Value>,
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub label: Option<Value>,
    #[serde(default)]
    pub streams: Option<Value>,
    #[serde(default)]
    pub activity: Option<Value>,
    #[serde(default)]
    pub percent_change: Option<Value>,
    #[serde(default)]
    pub weeks_on: Option<Value>,
    #[serde(default)]
    pub rtd_streams: Option<Value>,
    #[serde(default)]
    pub album_sales: Option<Value>,
    #[serde(default)]
    pub total_streams: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_week_record_from_sheet_json() {
        let raw = json!({
            "marketShares": {
                "Provident": { "percentage": 31.5, "volume": 120000.0 },
                "CCMG": { "percentage": 22.0 }
            },
            "totalMarketShareVolume": { "value": 380000.0 },
            "totalStreaming": 9100000.0,
            "notes": "ignored"
        });

        let record: WeekRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.market_shares.len(), 2);
        assert_eq!(record.market_shares["CCMG"].volume, None);
        assert_eq!(record.total_market_share_volume.unwrap().value, 380000.0);
        assert_eq!(record.total_streaming, Some(9100000.0));
    }

    #[test]
    fn test_weekly_dataset_last_key_is_latest_week() {
        let raw = json!({
            "01/13/2024": { "marketShares": {} },
            "01/06/2024": { "marketShares": {} }
        });
        let dataset: WeeklyDataset = serde_json::from_value(raw).unwrap();
        let (latest, _) = dataset.last_key_value().unwrap();
        assert_eq!(latest, "01/13/2024");
    }

    #[test]
    fn test_version_token_accepts_numbers() {
        let info: VersionInfo = serde_json::from_value(json!({ "version": 42 })).unwrap();
        assert_eq!(info.token(), Some("42".to_string()));

        let info: VersionInfo = serde_json::from_value(json!({ "version": "v7" })).unwrap();
        assert_eq!(info.token(), Some("v7".to_string()));

        let info: VersionInfo = serde_json::from_value(json!({ "version": null })).unwrap();
        assert_eq!(info.token(), None);

        let info: VersionInfo = serde_json::from_value(json!({})).unwrap();
        assert_eq!(info.token(), None);
    }

    #[test]
    fn test_raw_chart_entry_tolerates_mixed_types() {
        let raw = json!({
            "thisWeekRank": "3",
            "lastWeekRank": 7,
            "artist": "Artist",
            "streams": ""
        });
        let entry: RawChartEntry = serde_json::from_value(raw).unwrap();
        assert_eq!(entry.this_week_rank, Some(json!("3")));
        assert_eq!(entry.last_week_rank, Some(json!(7)));
        assert!(entry.title.is_none());
        assert_eq!(entry.artist, Some(json!("Artist")));
    }
}
