//! Structured log events for key engine operations.
//!
//! Each function emits a `tracing` event with an `event` field naming it.

use andon_core::AndonState;

/// Log an event rejected at the normalizer boundary.
pub fn event_rejected(field: &str, reason: &str) {
    tracing::debug!(
        event = "event_rejected",
        field = %field,
        reason = %reason,
        "event rejected"
    );
}

/// Log an event dropped for being older than the lookback horizon.
pub fn event_stale(stage: &str, session_id: &str, age_secs: i64) {
    tracing::debug!(
        event = "event_stale",
        stage = %stage,
        session_id = %session_id,
        age_secs = age_secs,
        "stale event dropped"
    );
}

/// Log a stabilized state change of a stage.
pub fn state_transition(stage: &str, from: AndonState, to: AndonState, sigma_level: f64) {
    tracing::info!(
        event = "state_transition",
        stage = %stage,
        from = %from,
        to = %to,
        sigma_level = sigma_level,
        "stage state changed"
    );
}

/// Log a new alert.
pub fn alert_raised(alert_id: &str, stage: &str, state: AndonState, actions: usize) {
    match state {
        AndonState::Stop => tracing::error!(
            event = "alert_raised",
            alert_id = %alert_id,
            stage = %stage,
            state = %state,
            actions = actions,
            "andon alert raised"
        ),
        AndonState::Attention | AndonState::Unknown => tracing::warn!(
            event = "alert_raised",
            alert_id = %alert_id,
            stage = %stage,
            state = %state,
            actions = actions,
            "andon alert raised"
        ),
        AndonState::Normal => tracing::info!(
            event = "alert_raised",
            alert_id = %alert_id,
            stage = %stage,
            state = %state,
            actions = actions,
            "andon alert raised"
        ),
    }
}

/// Log an open alert being superseded by a newer one on the same stage.
pub fn alert_superseded(previous_id: &str, next_id: &str, stage: &str) {
    tracing::debug!(
        event = "alert_superseded",
        previous_id = %previous_id,
        next_id = %next_id,
        stage = %stage,
        "alert superseded"
    );
}

/// Log dispatcher feedback on an action.
pub fn action_status_updated(alert_id: &str, index: usize, status: &str) {
    tracing::info!(
        event = "action_status_updated",
        alert_id = %alert_id,
        index = index,
        status = %status,
        "alert action status updated"
    );
}

/// Log a dispatcher that failed to take an alert.
pub fn dispatch_failed(dispatcher: &str, alert_id: &str, reason: &str) {
    tracing::warn!(
        event = "dispatch_failed",
        dispatcher = %dispatcher,
        alert_id = %alert_id,
        reason = %reason,
        "alert dispatch failed"
    );
}

/// Log a configuration reload.
pub fn generation_swapped(previous: u64, next: u64, stages: usize) {
    tracing::info!(
        event = "generation_swapped",
        previous = previous,
        next = next,
        stages = stages,
        "engine generation swapped"
    );
}

/// Log a finished evaluation tick.
pub fn tick_completed(generation: u64, stages: usize, transitions: usize, alerts: usize) {
    tracing::debug!(
        event = "tick_completed",
        generation = generation,
        stages = stages,
        transitions = transitions,
        alerts = alerts,
        "evaluation tick completed"
    );
}

/// Log a tick abandoned on cancellation.
pub fn tick_cancelled(generation: u64, evaluated: usize, remaining: usize) {
    tracing::info!(
        event = "tick_cancelled",
        generation = generation,
        evaluated = evaluated,
        remaining = remaining,
        "evaluation tick cancelled"
    );
}
