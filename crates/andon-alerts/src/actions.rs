//! Response protocol: which actions a transition requests, and of whom.

use chrono::{DateTime, Utc};

use andon_core::config::ActionPolicyConfig;
use andon_core::models::{ActionType, AlertAction};
use andon_core::AndonState;

/// Actions requested for a transition of `stage` from `from` to `to`.
///
/// - STOP: notify on-call, escalate, investigate (when `stop_investigation_target` is
///   set), and stop traffic to the stage (gated by `stop_traffic_min_sigma` when set).
/// - ATTENTION: notify, investigate.
/// - NORMAL after ATTENTION or STOP: informational notify.
/// - UNKNOWN: notify that the stage lost its baseline.
/// - NORMAL from UNKNOWN: baseline established, nothing to do.
pub fn derive_actions(
    stage: &str,
    from: AndonState,
    to: AndonState,
    sigma_level: f64,
    policy: &ActionPolicyConfig,
    at: DateTime<Utc>,
) -> Vec<AlertAction> {
    match to {
        AndonState::Stop => {
            let mut actions = vec![
                AlertAction::pending(
                    ActionType::Notify,
                    policy.notify_target(stage, &policy.on_call_target),
                    at,
                ),
                AlertAction::pending(ActionType::Escalate, policy.escalation_target.as_str(), at),
            ];
            if let Some(target) = &policy.stop_investigation_target {
                actions.push(AlertAction::pending(ActionType::Investigate, target.as_str(), at));
            }
            if should_stop_traffic(sigma_level, policy) {
                actions.push(AlertAction::pending(ActionType::StopTraffic, stage, at));
            }
            actions
        }
        AndonState::Attention => vec![
            AlertAction::pending(
                ActionType::Notify,
                policy.notify_target(stage, &policy.attention_target),
                at,
            ),
            AlertAction::pending(
                ActionType::Investigate,
                policy.investigation_target.as_str(),
                at,
            ),
        ],
        AndonState::Normal if from == AndonState::Unknown => Vec::new(),
        AndonState::Normal | AndonState::Unknown => vec![AlertAction::pending(
            ActionType::Notify,
            policy.notify_target(stage, &policy.attention_target),
            at,
        )],
    }
}

fn should_stop_traffic(sigma_level: f64, policy: &ActionPolicyConfig) -> bool {
    policy
        .stop_traffic_min_sigma
        .map_or(true, |min| sigma_level >= min)
}
