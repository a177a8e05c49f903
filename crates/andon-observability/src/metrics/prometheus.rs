//! Prometheus text exposition (format 0.0.4).
//!
//! Counters use `andon_*_total` names; the only labels are `state`, `rule`
//! (`sigma` | `weco`) and `stage`, all bounded by configuration.

use std::fmt::Write;

use andon_core::constants::{RULE_SIGMA, RULE_WESTERN_ELECTRIC};

use super::MetricsSnapshot;

pub fn render(snapshot: &MetricsSnapshot) -> String {
    let mut out = String::new();

    let events = [
        ("andon_events_accepted_total", "Events applied to stage statistics", snapshot.events_accepted),
        ("andon_events_rejected_total", "Events rejected by validation", snapshot.events_rejected),
        ("andon_events_stale_total", "Events older than the lookback horizon", snapshot.events_stale),
        ("andon_events_late_total", "Outcomes folded into a later subgroup", snapshot.events_late),
        ("andon_events_disabled_total", "Events dropped while monitoring is disabled", snapshot.events_disabled),
        ("andon_writer_busy_total", "Submissions that timed out waiting for a stage writer", snapshot.writer_busy),
    ];
    for (name, help, value) in events {
        counter(&mut out, name, help, value);
    }

    header(&mut out, "andon_alerts_total", "Alerts raised by target state", "counter");
    for (state, value) in [
        ("normal", snapshot.alerts_normal),
        ("attention", snapshot.alerts_attention),
        ("stop", snapshot.alerts_stop),
        ("unknown", snapshot.alerts_unknown),
    ] {
        let _ = writeln!(out, "andon_alerts_total{{state=\"{state}\"}} {value}");
    }

    header(&mut out, "andon_attention_total", "Count of Andon ATTENTION events", "counter");
    labelled(&mut out, "andon_attention_total", RULE_SIGMA, snapshot.attention_sigma);
    labelled(&mut out, "andon_attention_total", RULE_WESTERN_ELECTRIC, snapshot.attention_weco);

    header(&mut out, "andon_stop_total", "Count of Andon STOP events", "counter");
    labelled(&mut out, "andon_stop_total", RULE_SIGMA, snapshot.stop_sigma);
    labelled(&mut out, "andon_stop_total", RULE_WESTERN_ELECTRIC, snapshot.stop_weco);

    let ops = [
        ("andon_dispatch_failures_total", "Actions reported failed or dispatchers that panicked", snapshot.dispatch_failures),
        ("andon_ticks_completed_total", "Evaluation ticks completed", snapshot.ticks_completed),
        ("andon_ticks_cancelled_total", "Evaluation ticks cancelled", snapshot.ticks_cancelled),
    ];
    for (name, help, value) in ops {
        counter(&mut out, name, help, value);
    }

    header(&mut out, "andon_stage_sigma_level", "Latest sigma level per stage", "gauge");
    for (stage, value) in &snapshot.sigma_levels {
        let _ = writeln!(
            out,
            "andon_stage_sigma_level{{stage=\"{}\"}} {}",
            escape(stage),
            float(*value)
        );
    }
    out
}

fn header(out: &mut String, name: &str, help: &str, kind: &str) {
    let _ = writeln!(out, "# HELP {name} {help}");
    let _ = writeln!(out, "# TYPE {name} {kind}");
}

fn counter(out: &mut String, name: &str, help: &str, value: u64) {
    header(out, name, help, "counter");
    let _ = writeln!(out, "{name} {value}");
}

fn labelled(out: &mut String, name: &str, rule: &str, value: u64) {
    let _ = writeln!(out, "{name}{{rule=\"{rule}\"}} {value}");
}

fn float(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        value.to_string()
    }
}

fn escape(label: &str) -> String {
    label
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
