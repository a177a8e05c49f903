//! Ingestion events. Immutable once created; produced by upstream instrumentation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observation of a session reaching a funnel stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelStageEvent {
    pub stage: String,
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Why a session left the funnel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropoffType {
    Exit,
    Timeout,
    Error,
    Abandonment,
}

/// A session leaving `from_stage`. `to_stage == None` is a terminal exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropoffEvent {
    pub session_id: String,
    pub from_stage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_stage: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub dropoff_type: DropoffType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
    /// Potential revenue lost.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

/// Anything the ingestion interface accepts.
///
/// Untagged on the wire: a payload carrying `dropoffType` and `fromStage` is a dropoff,
/// otherwise it must be a stage event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IngestEvent {
    Dropoff(DropoffEvent),
    Stage(FunnelStageEvent),
}

impl IngestEvent {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Dropoff(e) => e.timestamp,
            Self::Stage(e) => e.timestamp,
        }
    }

    pub fn session_id(&self) -> &str {
        match self {
            Self::Dropoff(e) => &e.session_id,
            Self::Stage(e) => &e.session_id,
        }
    }

    /// The stage whose aggregate this event lands in first.
    pub fn stage(&self) -> &str {
        match self {
            Self::Dropoff(e) => &e.from_stage,
            Self::Stage(e) => &e.stage,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Dropoff(_) => "dropoff",
            Self::Stage(_) => "stage",
        }
    }
}

impl From<FunnelStageEvent> for IngestEvent {
    fn from(event: FunnelStageEvent) -> Self {
        Self::Stage(event)
    }
}

impl From<DropoffEvent> for IngestEvent {
    fn from(event: DropoffEvent) -> Self {
        Self::Dropoff(event)
    }
}
