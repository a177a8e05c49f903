use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Who receives the actions attached to an alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionPolicyConfig {
    /// Notified on STOP.
    pub on_call_target: String,
    /// Escalated to on STOP.
    pub escalation_target: String,
    /// Notified on ATTENTION, recovery to NORMAL, and loss of data (UNKNOWN).
    pub attention_target: String,
    /// Asked to investigate on ATTENTION.
    pub investigation_target: String,
    /// Asked to investigate on STOP. `None` leaves investigation out of the STOP protocol.
    pub stop_investigation_target: Option<String>,
    /// `stop_traffic` is only requested at or above this sigma level. `None` always requests it.
    pub stop_traffic_min_sigma: Option<f64>,
    /// Per-stage notification channel. Overrides the notify target for that stage.
    pub stage_channels: HashMap<String, String>,
}

impl ActionPolicyConfig {
    /// Notify target for a stage, falling back to `default_target`.
    pub fn notify_target<'a>(&'a self, stage: &str, default_target: &'a str) -> &'a str {
        self.stage_channels
            .get(stage)
            .map(String::as_str)
            .unwrap_or(default_target)
    }
}

impl Default for ActionPolicyConfig {
    fn default() -> Self {
        Self {
            on_call_target: defaults::DEFAULT_ON_CALL_TARGET.to_string(),
            escalation_target: defaults::DEFAULT_ESCALATION_TARGET.to_string(),
            attention_target: defaults::DEFAULT_ATTENTION_TARGET.to_string(),
            investigation_target: defaults::DEFAULT_INVESTIGATION_TARGET.to_string(),
            stop_investigation_target: Some(defaults::DEFAULT_STOP_INVESTIGATION_TARGET.to_string()),
            stop_traffic_min_sigma: None,
            stage_channels: HashMap::new(),
        }
    }
}
