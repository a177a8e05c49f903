//! Engine counters.
//!
//! [`EngineMetrics`] is shared by reference between the ingestion path, the evaluation
//! tick, and the alert log. Every counter is a relaxed atomic; a consumer reads a
//! [`MetricsSnapshot`] or the Prometheus text exposition.

pub mod prometheus;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::Serialize;

use andon_core::constants::RULE_WESTERN_ELECTRIC;
use andon_core::AndonState;

/// Atomic counters plus a per-stage sigma-level gauge.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    events_accepted: AtomicU64,
    events_rejected: AtomicU64,
    events_stale: AtomicU64,
    events_late: AtomicU64,
    events_disabled: AtomicU64,
    writer_busy: AtomicU64,

    alerts_normal: AtomicU64,
    alerts_attention: AtomicU64,
    alerts_stop: AtomicU64,
    alerts_unknown: AtomicU64,

    attention_sigma: AtomicU64,
    attention_weco: AtomicU64,
    stop_sigma: AtomicU64,
    stop_weco: AtomicU64,

    dispatch_failures: AtomicU64,
    ticks_completed: AtomicU64,
    ticks_cancelled: AtomicU64,

    sigma_levels: DashMap<String, f64>,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_accepted(&self) {
        self.events_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.events_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stale(&self) {
        self.events_stale.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_late(&self, count: u64) {
        self.events_late.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_disabled(&self) {
        self.events_disabled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_writer_busy(&self) {
        self.writer_busy.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a raised alert. ATTENTION and STOP are also counted per rule;
    /// anything other than the Western Electric label counts as the sigma rule.
    pub fn record_alert(&self, state: AndonState, rule: Option<&str>) {
        let by_state = match state {
            AndonState::Normal => &self.alerts_normal,
            AndonState::Attention => &self.alerts_attention,
            AndonState::Stop => &self.alerts_stop,
            AndonState::Unknown => &self.alerts_unknown,
        };
        by_state.fetch_add(1, Ordering::Relaxed);

        let weco = rule == Some(RULE_WESTERN_ELECTRIC);
        let by_rule = match (state, weco) {
            (AndonState::Attention, false) => &self.attention_sigma,
            (AndonState::Attention, true) => &self.attention_weco,
            (AndonState::Stop, false) => &self.stop_sigma,
            (AndonState::Stop, true) => &self.stop_weco,
            _ => return,
        };
        by_rule.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dispatch_failure(&self) {
        self.dispatch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_tick_completed(&self) {
        self.ticks_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_tick_cancelled(&self) {
        self.ticks_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    /// Latest sigma level of a stage. Non-finite levels are kept as-is.
    pub fn set_sigma_level(&self, stage: &str, sigma_level: f64) {
        self.sigma_levels.insert(stage.to_string(), sigma_level);
    }

    /// Drop gauges of stages no longer configured.
    pub fn retain_stages(&self, stages: &[String]) {
        self.sigma_levels.retain(|stage, _| stages.contains(stage));
    }

    pub fn sigma_level(&self, stage: &str) -> Option<f64> {
        self.sigma_levels.get(stage).map(|v| *v)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        MetricsSnapshot {
            events_accepted: load(&self.events_accepted),
            events_rejected: load(&self.events_rejected),
            events_stale: load(&self.events_stale),
            events_late: load(&self.events_late),
            events_disabled: load(&self.events_disabled),
            writer_busy: load(&self.writer_busy),
            alerts_normal: load(&self.alerts_normal),
            alerts_attention: load(&self.alerts_attention),
            alerts_stop: load(&self.alerts_stop),
            alerts_unknown: load(&self.alerts_unknown),
            attention_sigma: load(&self.attention_sigma),
            attention_weco: load(&self.attention_weco),
            stop_sigma: load(&self.stop_sigma),
            stop_weco: load(&self.stop_weco),
            dispatch_failures: load(&self.dispatch_failures),
            ticks_completed: load(&self.ticks_completed),
            ticks_cancelled: load(&self.ticks_cancelled),
            sigma_levels: self
                .sigma_levels
                .iter()
                .map(|r| (r.key().clone(), *r.value()))
                .collect(),
        }
    }

    /// Prometheus text exposition of the current counters.
    pub fn render_prometheus(&self) -> String {
        prometheus::render(&self.snapshot())
    }
}

/// Point-in-time copy of every counter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub events_accepted: u64,
    pub events_rejected: u64,
    pub events_stale: u64,
    pub events_late: u64,
    pub events_disabled: u64,
    pub writer_busy: u64,
    pub alerts_normal: u64,
    pub alerts_attention: u64,
    pub alerts_stop: u64,
    pub alerts_unknown: u64,
    pub attention_sigma: u64,
    pub attention_weco: u64,
    pub stop_sigma: u64,
    pub stop_weco: u64,
    pub dispatch_failures: u64,
    pub ticks_completed: u64,
    pub ticks_cancelled: u64,
    /// Ordered by stage id for stable output.
    pub sigma_levels: BTreeMap<String, f64>,
}

impl MetricsSnapshot {
    pub fn alerts_total(&self) -> u64 {
        self.alerts_normal + self.alerts_attention + self.alerts_stop + self.alerts_unknown
    }
}
