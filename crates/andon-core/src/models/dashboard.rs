//! Point-in-time dashboard across all stages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AndonAlert, AndonState, FunnelMetrics, ProcessCapability};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageStatus {
    pub name: String,
    pub status: AndonState,
    pub metrics: FunnelMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capability: Option<ProcessCapability>,
    /// Most recent alerts, newest first.
    pub alerts: Vec<AndonAlert>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_sessions: u64,
    pub total_dropoffs: u64,
    pub overall_conversion_rate: f64,
    pub potential_revenue_lost: f64,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AndonDashboard {
    pub overall_status: AndonState,
    /// Engine generation the snapshot was taken from.
    pub generation: u64,
    pub stages: Vec<StageStatus>,
    pub summary: DashboardSummary,
}
