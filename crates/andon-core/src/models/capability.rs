//! Read-only process-capability view for dashboards. Not authoritative state.

use serde::{Deserialize, Serialize};

use super::StatisticalMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Stable,
    Unstable,
    Improving,
    Degrading,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessCapability {
    pub stage: String,
    pub baseline_metrics: StatisticalMetrics,
    pub current_value: f64,
    pub sigma_level: f64,
    pub capability: Capability,
    pub trend: Trend,
}
