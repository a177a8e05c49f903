use std::sync::Arc;

use andon_alerts::{AlertManager, ChannelDispatcher, DispatchHub, TransitionContext};
use andon_core::config::ActionPolicyConfig;
use andon_core::errors::{AlertError, AndonErrorCode};
use andon_core::models::{ActionStatus, ActionType, AlertMetrics};
use andon_core::{AndonState, StatisticalMetrics};
use andon_observability::EngineMetrics;
use chrono::{Duration, Utc};

fn transition<'a>(stage: &'a str, from: AndonState, to: AndonState, sigma: f64) -> TransitionContext<'a> {
    TransitionContext {
        stage,
        from,
        to,
        rule: Some("sigma"),
        metrics: AlertMetrics {
            current_rate: 0.42,
            sigma_level: sigma,
            baseline: StatisticalMetrics::from_moments(0.2, 0.05, 60, Utc::now()),
        },
        at: Utc::now(),
    }
}

fn manager() -> (AlertManager, Arc<EngineMetrics>) {
    let metrics = Arc::new(EngineMetrics::new());
    (AlertManager::new(metrics.clone()), metrics)
}

// ── Append-only log with one open alert per stage ──────────────────────────

#[test]
fn new_transition_supersedes_open_alert() {
    let (alerts, _) = manager();
    let policy = ActionPolicyConfig::default();

    let first = alerts.on_transition(transition("checkout", AndonState::Normal, AndonState::Stop, 4.4), &policy);
    let second = alerts.on_transition(transition("checkout", AndonState::Stop, AndonState::Normal, 0.3), &policy);

    assert_eq!(alerts.len(), 2);
    let first = alerts.get(&first.id).unwrap();
    assert_eq!(first.superseded_by.as_deref(), Some(second.id.as_str()));
    assert!(!first.is_open());
    assert_eq!(alerts.open_alert("checkout").map(|a| a.id), Some(second.id));
}

#[test]
fn stages_keep_independent_open_alerts() {
    let (alerts, _) = manager();
    let policy = ActionPolicyConfig::default();
    alerts.on_transition(transition("checkout", AndonState::Normal, AndonState::Attention, 2.2), &policy);
    alerts.on_transition(transition("payment", AndonState::Normal, AndonState::Stop, 3.5), &policy);

    assert_eq!(alerts.open_alert("checkout").map(|a| a.state), Some(AndonState::Attention));
    assert_eq!(alerts.open_alert("payment").map(|a| a.state), Some(AndonState::Stop));
    assert!(alerts.open_alert("landing").is_none());
}

#[test]
fn recent_is_newest_first_and_bounded() {
    let (alerts, _) = manager();
    let policy = ActionPolicyConfig::default();
    let mut ids = Vec::new();
    let states = [AndonState::Attention, AndonState::Stop, AndonState::Attention, AndonState::Normal];
    let mut from = AndonState::Normal;
    for to in states {
        ids.push(alerts.on_transition(transition("pricing", from, to, 2.5), &policy).id);
        from = to;
    }
    let recent: Vec<String> = alerts.recent("pricing", 2).into_iter().map(|a| a.id).collect();
    assert_eq!(recent, vec![ids[3].clone(), ids[2].clone()]);
    assert_eq!(alerts.history("pricing").len(), 4);
    assert_eq!(alerts.history("pricing").iter().filter(|a| a.is_open()).count(), 1);
}

#[test]
fn alert_ids_are_unique() {
    let (alerts, _) = manager();
    let policy = ActionPolicyConfig::default();
    let a = alerts.on_transition(transition("s", AndonState::Normal, AndonState::Stop, 3.0), &policy);
    let b = alerts.on_transition(transition("s", AndonState::Stop, AndonState::Unknown, 0.0), &policy);
    assert_ne!(a.id, b.id);
    assert!(uuid::Uuid::parse_str(&a.id).is_ok());
}

// ── Dispatcher feedback ────────────────────────────────────────────────────

#[test]
fn action_status_updates_are_recorded() {
    let (alerts, metrics) = manager();
    let alert = alerts.on_transition(
        transition("checkout", AndonState::Normal, AndonState::Stop, 4.4),
        &ActionPolicyConfig::default(),
    );
    assert_eq!(alert.actions[0].action_type, ActionType::Notify);

    alerts.update_action_status(&alert.id, 0, ActionStatus::Completed).unwrap();
    let updated = alerts.update_action_status(&alert.id, 1, ActionStatus::Failed).unwrap();

    assert_eq!(updated.actions[0].status, ActionStatus::Completed);
    assert_eq!(updated.actions[1].status, ActionStatus::Failed);
    assert_eq!(updated.actions[2].status, ActionStatus::Pending);
    assert_eq!(metrics.snapshot().dispatch_failures, 1);
}

#[test]
fn superseded_alert_still_accepts_feedback() {
    let (alerts, _) = manager();
    let policy = ActionPolicyConfig::default();
    let old = alerts.on_transition(transition("s", AndonState::Normal, AndonState::Attention, 2.0), &policy);
    alerts.on_transition(transition("s", AndonState::Attention, AndonState::Stop, 3.0), &policy);
    let updated = alerts.update_action_status(&old.id, 1, ActionStatus::Completed).unwrap();
    assert_eq!(updated.actions[1].status, ActionStatus::Completed);
}

#[test]
fn unknown_alert_and_action_are_errors() {
    let (alerts, _) = manager();
    let err = alerts.update_action_status("missing", 0, ActionStatus::Completed).unwrap_err();
    assert_eq!(err.error_code(), "ALERT_NOT_FOUND");

    let alert = alerts.on_transition(
        transition("s", AndonState::Normal, AndonState::Attention, 2.0),
        &ActionPolicyConfig::default(),
    );
    let err = alerts.update_action_status(&alert.id, 7, ActionStatus::Completed).unwrap_err();
    assert_eq!(
        err,
        AlertError::ActionNotFound {
            alert_id: alert.id.clone(),
            index: 7,
            action_count: 2,
        }
    );
}

// ── Counters ───────────────────────────────────────────────────────────────

#[test]
fn alerts_are_counted_by_state_and_rule() {
    let (alerts, metrics) = manager();
    let policy = ActionPolicyConfig::default();
    alerts.on_transition(transition("s", AndonState::Normal, AndonState::Stop, 3.0), &policy);
    let mut weco = transition("s", AndonState::Stop, AndonState::Attention, 1.2);
    weco.rule = Some("weco");
    weco.at += Duration::minutes(3);
    alerts.on_transition(weco, &policy);

    let snap = metrics.snapshot();
    assert_eq!(snap.alerts_stop, 1);
    assert_eq!(snap.stop_sigma, 1);
    assert_eq!(snap.attention_weco, 1);
}

// ── Async consumers ────────────────────────────────────────────────────────

#[tokio::test]
async fn hub_delivers_to_channel_consumers() {
    let (alerts, _) = manager();
    let hub = DispatchHub::new();
    let (dispatcher, mut rx) = ChannelDispatcher::new("pager");
    hub.register(Arc::new(dispatcher));

    let alert = alerts.on_transition(
        transition("payment", AndonState::Normal, AndonState::Stop, 5.0),
        &ActionPolicyConfig::default(),
    );
    assert_eq!(hub.dispatch(&alert), 0);

    let received = rx.recv().await.unwrap();
    assert_eq!(received.id, alert.id);
    assert_eq!(received.state, AndonState::Stop);
}
