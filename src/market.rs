//! Weekly market summary
//!
//! Label shares for one week, ranked by percentage, with week-over-week
//! changes against the previous week when it is loaded.

use serde::Serialize;

use crate::client::models::WeekRecord;

/// Leader changes at or below this many points are not worth mentioning
const LEADER_CHANGE_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelShare {
    pub label: String,
    pub percentage: f64,
    pub volume: Option<f64>,
    /// Percentage points against the previous week
    pub change: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSummary {
    pub week: String,
    pub labels: Vec<LabelShare>,
    pub total_volume: Option<f64>,
    /// Percent change of total volume
    pub total_volume_change: Option<f64>,
    pub total_streaming: Option<f64>,
    /// Percent change of total streaming
    pub total_streaming_change: Option<f64>,
}

impl MarketSummary {
    pub fn new(week: &str, current: &WeekRecord, previous: Option<&WeekRecord>) -> Self {
        let mut labels: Vec<LabelShare> = current
            .market_shares
            .iter()
            .map(|(label, info)| LabelShare {
                label: label.clone(),
                percentage: info.percentage,
                volume: info.volume,
                change: previous
                    .and_then(|p| p.market_shares.get(label))
                    .map(|prev| info.percentage - prev.percentage),
            })
            .collect();
        labels.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));

        let total_volume = current.total_market_share_volume.as_ref().map(|v| v.value);
        let previous_volume = previous
            .and_then(|p| p.total_market_share_volume.as_ref())
            .map(|v| v.value);
        let previous_streaming = previous.and_then(|p| p.total_streaming);

        Self {
            week: week.to_string(),
            labels,
            total_volume,
            total_volume_change: percent_change(total_volume, previous_volume),
            total_streaming: current.total_streaming,
            total_streaming_change: percent_change(current.total_streaming, previous_streaming),
        }
    }

    /// Label with the largest share
    pub fn leader(&self) -> Option<&LabelShare> {
        self.labels.first()
    }

    /// One-line description of the week
    pub fn headline(&self) -> String {
        let mut text = format!(
            "Week ending {}: tracking {} labels.",
            self.week,
            self.labels.len()
        );
        if let Some(leader) = self.leader() {
            text.push_str(&format!(
                " {} leads with {:.1}% market share",
                leader.label, leader.percentage
            ));
            if let Some(change) = leader.change.filter(|c| c.abs() > LEADER_CHANGE_THRESHOLD) {
                let sign = if change > 0.0 { "+" } else { "" };
                text.push_str(&format!(" ({}{:.1}% from last week)", sign, change));
            }
            text.push('.');
        }
        text
    }
}

/// Relative change in percent; undefined without a non-zero baseline
fn percent_change(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    match (current, previous) {
        (Some(current), Some(previous)) if current != 0.0 && previous != 0.0 => {
            Some((current - previous) / previous * 100.0)
        }
        _ => None,
    }
}
