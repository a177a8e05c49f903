//! Human-readable alert messages.

use andon_core::models::AlertMetrics;
use andon_core::AndonState;

pub fn compose(stage: &str, from: AndonState, to: AndonState, metrics: &AlertMetrics) -> String {
    let rate = percent(metrics.current_rate);
    let baseline = percent(metrics.baseline.mean);
    let transition = format!("[{from} -> {to}]");

    match to {
        AndonState::Stop => format!(
            "CRITICAL: {stage} dropoff rate {rate} ({} {} baseline {baseline}) {transition}",
            sigma(metrics.sigma_level),
            direction(metrics),
        ),
        AndonState::Attention => format!(
            "ATTENTION: {stage} dropoff rate {rate} ({} {} baseline {baseline}) {transition}",
            sigma(metrics.sigma_level),
            direction(metrics),
        ),
        AndonState::Normal => {
            format!("NORMAL: {stage} dropoff rate {rate} (baseline {baseline}) {transition}")
        }
        AndonState::Unknown => format!(
            "UNKNOWN: {stage} insufficient data for analysis ({} observations) {transition}",
            metrics.baseline.sample_size
        ),
    }
}

fn percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

fn sigma(level: f64) -> String {
    if level.is_finite() {
        format!("{level:.1}σ")
    } else {
        "∞σ".to_string()
    }
}

fn direction(metrics: &AlertMetrics) -> &'static str {
    if metrics.current_rate >= metrics.baseline.mean {
        "above"
    } else {
        "below"
    }
}
