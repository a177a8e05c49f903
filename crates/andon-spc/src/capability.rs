//! Process capability and trend. A read-only dashboard view, never fed back into state.

use andon_core::config::AlertThresholds;
use andon_core::models::{Capability, ProcessCapability, Trend};
use andon_core::StatisticalMetrics;

/// Fewer points than this give a `Stable` trend.
const MIN_TREND_POINTS: usize = 3;

/// Drift across the trend window, in baseline sigmas, below which the trend is flat.
const TREND_SENSITIVITY_SIGMA: f64 = 0.5;

/// Least-squares slope of `values` against their index. `None` when undefined.
pub fn slope(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / n;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, y) in values.iter().enumerate() {
        let x_diff = i as f64 - x_mean;
        numerator += x_diff * (y - y_mean);
        denominator += x_diff * x_diff;
    }
    if denominator.abs() < f64::EPSILON {
        return None;
    }
    Some(numerator / denominator)
}

/// Direction of the recent rate observations, judged against the baseline spread.
pub fn trend(values: &[f64], standard_deviation: f64) -> Trend {
    if values.len() < MIN_TREND_POINTS {
        return Trend::Stable;
    }
    let Some(slope) = slope(values) else {
        return Trend::Stable;
    };
    let drift = slope * (values.len() - 1) as f64;
    let tolerance = if standard_deviation > 0.0 {
        TREND_SENSITIVITY_SIGMA * standard_deviation
    } else {
        f64::EPSILON
    };

    if drift > tolerance {
        Trend::Increasing
    } else if drift < -tolerance {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

/// Build the capability view of one stage.
///
/// The tracked metric is a dropoff rate, so a rising rate above the mean is degrading
/// and a falling rate below it is improving. STOP-level deviations are unstable.
pub fn assess(
    stage: &str,
    baseline: &StatisticalMetrics,
    current_value: f64,
    sigma_level: f64,
    recent: &[f64],
    thresholds: &AlertThresholds,
) -> ProcessCapability {
    let trend = trend(recent, baseline.standard_deviation);
    let capability = if sigma_level >= thresholds.stop {
        Capability::Unstable
    } else {
        match trend {
            Trend::Increasing if current_value > baseline.mean => Capability::Degrading,
            Trend::Decreasing if current_value < baseline.mean => Capability::Improving,
            _ => Capability::Stable,
        }
    };

    ProcessCapability {
        stage: stage.to_string(),
        baseline_metrics: baseline.clone(),
        current_value,
        sigma_level,
        capability,
        trend,
    }
}
