//! AlertManager: append-only alert log with one open alert per stage.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use andon_core::config::ActionPolicyConfig;
use andon_core::errors::AlertError;
use andon_core::models::{ActionStatus, AlertMetrics};
use andon_core::{AndonAlert, AndonState};
use andon_observability::tracing_setup::events;
use andon_observability::EngineMetrics;

use crate::{actions, message};

/// Everything the manager needs to know about one stabilized transition.
#[derive(Debug, Clone)]
pub struct TransitionContext<'a> {
    pub stage: &'a str,
    pub from: AndonState,
    pub to: AndonState,
    /// Classification rule behind an ATTENTION or STOP transition.
    pub rule: Option<&'a str>,
    pub metrics: AlertMetrics,
    pub at: DateTime<Utc>,
}

/// Thread-safe alert log.
///
/// Transitions of one stage are serialized by that stage's writer, so the
/// open-alert swap for a stage never races with itself. Status updates may arrive
/// from any thread at any time.
pub struct AlertManager {
    alerts: DashMap<String, AndonAlert>,
    /// Stage → id of its open alert.
    open: DashMap<String, String>,
    /// Stage → every alert id raised for it, oldest first.
    history: DashMap<String, Vec<String>>,
    metrics: Arc<EngineMetrics>,
}

impl AlertManager {
    pub fn new(metrics: Arc<EngineMetrics>) -> Self {
        Self {
            alerts: DashMap::new(),
            open: DashMap::new(),
            history: DashMap::new(),
            metrics,
        }
    }

    /// Record a transition as a new alert and supersede the stage's previous open alert.
    pub fn on_transition(
        &self,
        ctx: TransitionContext<'_>,
        policy: &ActionPolicyConfig,
    ) -> AndonAlert {
        let id = uuid::Uuid::new_v4().to_string();
        let actions = actions::derive_actions(
            ctx.stage,
            ctx.from,
            ctx.to,
            ctx.metrics.sigma_level,
            policy,
            ctx.at,
        );
        let alert = AndonAlert {
            id: id.clone(),
            state: ctx.to,
            previous_state: ctx.from,
            stage: ctx.stage.to_string(),
            message: message::compose(ctx.stage, ctx.from, ctx.to, &ctx.metrics),
            timestamp: ctx.at,
            metrics: ctx.metrics,
            actions,
            superseded_by: None,
        };

        self.alerts.insert(id.clone(), alert.clone());
        self.history
            .entry(ctx.stage.to_string())
            .or_default()
            .push(id.clone());

        if let Some(previous) = self.open.insert(ctx.stage.to_string(), id.clone()) {
            if let Some(mut prev) = self.alerts.get_mut(&previous) {
                prev.superseded_by = Some(id.clone());
            }
            events::alert_superseded(&previous, &id, ctx.stage);
        }

        self.metrics.record_alert(ctx.to, ctx.rule);
        events::alert_raised(&id, ctx.stage, ctx.to, alert.actions.len());
        alert
    }

    /// Record dispatcher feedback for one action. `failed` counts as a delivery failure.
    pub fn update_action_status(
        &self,
        alert_id: &str,
        index: usize,
        status: ActionStatus,
    ) -> Result<AndonAlert, AlertError> {
        let mut alert = self
            .alerts
            .get_mut(alert_id)
            .ok_or_else(|| AlertError::AlertNotFound {
                alert_id: alert_id.to_string(),
            })?;
        let action_count = alert.actions.len();
        let action = alert
            .actions
            .get_mut(index)
            .ok_or_else(|| AlertError::ActionNotFound {
                alert_id: alert_id.to_string(),
                index,
                action_count,
            })?;

        action.status = status;
        let target = action.target.clone();
        let status_text = match status {
            ActionStatus::Pending => "pending",
            ActionStatus::Completed => "completed",
            ActionStatus::Failed => "failed",
        };
        events::action_status_updated(alert_id, index, status_text);
        if status == ActionStatus::Failed {
            self.metrics.record_dispatch_failure();
            events::dispatch_failed(&target, alert_id, "action reported failed");
        }
        Ok(alert.clone())
    }

    pub fn get(&self, alert_id: &str) -> Option<AndonAlert> {
        self.alerts.get(alert_id).map(|r| r.clone())
    }

    /// The stage's alert that no later transition has superseded.
    pub fn open_alert(&self, stage: &str) -> Option<AndonAlert> {
        let id = self.open.get(stage).map(|r| r.clone())?;
        self.get(&id)
    }

    /// Up to `limit` most recent alerts of a stage, newest first.
    pub fn recent(&self, stage: &str, limit: usize) -> Vec<AndonAlert> {
        let ids: Vec<String> = match self.history.get(stage) {
            Some(ids) => ids.iter().rev().take(limit).cloned().collect(),
            None => return Vec::new(),
        };
        ids.iter().filter_map(|id| self.get(id)).collect()
    }

    /// Every alert of a stage, oldest first.
    pub fn history(&self, stage: &str) -> Vec<AndonAlert> {
        let ids: Vec<String> = self
            .history
            .get(stage)
            .map(|ids| ids.clone())
            .unwrap_or_default();
        ids.iter().filter_map(|id| self.get(id)).collect()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

impl std::fmt::Debug for AlertManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertManager")
            .field("alerts", &self.alerts.len())
            .field("open", &self.open.len())
            .finish()
    }
}
