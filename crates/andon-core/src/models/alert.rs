//! Andon alerts and the actions requested from the external dispatcher.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AndonState, StatisticalMetrics};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Notify,
    Escalate,
    Investigate,
    StopTraffic,
}

/// Owned by the dispatcher; reported back asynchronously.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertAction {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub target: String,
    pub timestamp: DateTime<Utc>,
    pub status: ActionStatus,
}

impl AlertAction {
    pub fn pending(action_type: ActionType, target: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            action_type,
            target: target.into(),
            timestamp: at,
            status: ActionStatus::Pending,
        }
    }
}

/// Measurements at the moment of the transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertMetrics {
    pub current_rate: f64,
    /// `+inf` when the baseline has zero spread and the rate differs from it.
    pub sigma_level: f64,
    pub baseline: StatisticalMetrics,
}

/// Created on a stabilized state transition, never on a held state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AndonAlert {
    pub id: String,
    pub state: AndonState,
    pub previous_state: AndonState,
    pub stage: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub metrics: AlertMetrics,
    pub actions: Vec<AlertAction>,
    /// Id of the alert raised by the next transition of the same stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superseded_by: Option<String>,
}

impl AndonAlert {
    /// Open until a further transition of the same stage supersedes it.
    pub fn is_open(&self) -> bool {
        self.superseded_by.is_none()
    }
}
