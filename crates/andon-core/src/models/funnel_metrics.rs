use serde::{Deserialize, Serialize};

/// Funnel counters of one stage over the active window.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelMetrics {
    pub stage: String,
    /// Sessions that reached the stage.
    pub arrivals: u64,
    /// Sessions that moved on to the next stage (terminal stage: arrivals).
    pub conversions: u64,
    pub dropoffs: u64,
    /// `conversions / (conversions + dropoffs)`, 0 with no outcomes.
    pub conversion_rate: f64,
    /// Average seconds spent in the stage before converting or dropping off.
    pub time_spent: f64,
    /// Potential revenue lost to dropoffs from this stage.
    pub value: f64,
}
