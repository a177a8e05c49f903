//! Derived baseline statistics for a stage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{CONTROL_LIMIT_SIGMA, WARNING_LIMIT_SIGMA};

/// Baseline snapshot recomputed on each window roll.
///
/// Lower limits are clamped at 0 since every tracked metric is a rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticalMetrics {
    pub mean: f64,
    pub standard_deviation: f64,
    pub upper_control_limit: f64,
    pub lower_control_limit: f64,
    pub upper_warning_limit: f64,
    pub lower_warning_limit: f64,
    pub sample_size: usize,
    pub last_calculated: DateTime<Utc>,
}

impl StatisticalMetrics {
    /// Build limits from the window moments.
    pub fn from_moments(
        mean: f64,
        standard_deviation: f64,
        sample_size: usize,
        last_calculated: DateTime<Utc>,
    ) -> Self {
        Self {
            mean,
            standard_deviation,
            upper_control_limit: mean + CONTROL_LIMIT_SIGMA * standard_deviation,
            lower_control_limit: (mean - CONTROL_LIMIT_SIGMA * standard_deviation).max(0.0),
            upper_warning_limit: mean + WARNING_LIMIT_SIGMA * standard_deviation,
            lower_warning_limit: (mean - WARNING_LIMIT_SIGMA * standard_deviation).max(0.0),
            sample_size,
            last_calculated,
        }
    }

    /// Metrics of an empty window.
    pub fn empty(last_calculated: DateTime<Utc>) -> Self {
        Self::from_moments(0.0, 0.0, 0, last_calculated)
    }
}
