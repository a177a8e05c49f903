//! Counters, Prometheus exposition, and tracing setup.

use andon_core::constants::{RULE_SIGMA, RULE_WESTERN_ELECTRIC};
use andon_core::AndonState;
use andon_observability::tracing_setup::{events, spans};
use andon_observability::{init_tracing, EngineMetrics};

// ── Prometheus text ────────────────────────────────────────────────────────

#[test]
fn prometheus_exposes_rule_labelled_totals() {
    let metrics = EngineMetrics::new();
    metrics.record_accepted();
    metrics.record_accepted();
    metrics.record_alert(AndonState::Stop, Some(RULE_SIGMA));
    metrics.record_alert(AndonState::Attention, Some(RULE_WESTERN_ELECTRIC));
    metrics.set_sigma_level("checkout", 3.25);

    let text = metrics.render_prometheus();
    assert!(text.contains("# TYPE andon_events_accepted_total counter"));
    assert!(text.contains("andon_events_accepted_total 2"));
    assert!(text.contains("andon_stop_total{rule=\"sigma\"} 1"));
    assert!(text.contains("andon_stop_total{rule=\"weco\"} 0"));
    assert!(text.contains("andon_attention_total{rule=\"weco\"} 1"));
    assert!(text.contains("andon_alerts_total{state=\"stop\"} 1"));
    assert!(text.contains("andon_stage_sigma_level{stage=\"checkout\"} 3.25"));
}

#[test]
fn every_sample_line_uses_the_andon_prefix() {
    let metrics = EngineMetrics::new();
    metrics.set_sigma_level("landing", 0.0);
    for line in metrics.render_prometheus().lines() {
        if line.starts_with('#') {
            continue;
        }
        assert!(line.starts_with("andon_"), "unexpected line: {line}");
    }
}

// ── Snapshot serde ─────────────────────────────────────────────────────────

#[test]
fn snapshot_serializes_to_json() {
    let metrics = EngineMetrics::new();
    metrics.record_rejected();
    metrics.record_stale();
    metrics.record_late(3);
    metrics.record_tick_completed();
    metrics.set_sigma_level("payment", 1.0);

    let json = serde_json::to_value(metrics.snapshot()).unwrap();
    assert_eq!(json["events_rejected"], 1);
    assert_eq!(json["events_stale"], 1);
    assert_eq!(json["events_late"], 3);
    assert_eq!(json["ticks_completed"], 1);
    assert_eq!(json["sigma_levels"]["payment"], 1.0);
}

#[test]
fn counters_are_safe_across_threads() {
    let metrics = std::sync::Arc::new(EngineMetrics::new());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let m = metrics.clone();
            std::thread::spawn(move || {
                for _ in 0..1000 {
                    m.record_accepted();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(metrics.snapshot().events_accepted, 8000);
}

// ── Tracing setup ──────────────────────────────────────────────────────────

#[test]
fn init_tracing_is_idempotent_and_events_emit() {
    init_tracing();
    init_tracing();
    let span = andon_observability::tick_span!(1u64, "2026-01-01T00:00:00Z");
    let _guard = span.enter();
    events::state_transition("checkout", AndonState::Normal, AndonState::Stop, 3.4);
    events::alert_raised("a-1", "checkout", AndonState::Stop, 3);
    events::tick_completed(1, 5, 1, 1);
    assert_eq!(spans::names::TICK, "andon.tick");
}
