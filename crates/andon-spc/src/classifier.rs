//! Control-limit classifier. Pure: never writes alerts or touches tracker state.

use serde::Serialize;

use andon_core::config::AlertThresholds;
use andon_core::constants::RULE_SIGMA;
use andon_core::{AndonState, MonitoringConfig, StatisticalMetrics};

/// Raw per-tick verdict for one stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub stage: String,
    pub state: AndonState,
    /// Distance from the baseline mean in standard deviations. 0 when UNKNOWN.
    pub sigma_level: f64,
    /// Rule that produced an ATTENTION or STOP verdict.
    pub rule: Option<&'static str>,
}

impl Classification {
    pub fn unknown(stage: &str) -> Self {
        Self {
            stage: stage.to_string(),
            state: AndonState::Unknown,
            sigma_level: 0.0,
            rule: None,
        }
    }
}

/// Maps a current rate to a raw Andon state against configured sigma thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classifier {
    thresholds: AlertThresholds,
    min_sample_size: usize,
}

impl Classifier {
    pub fn new(thresholds: AlertThresholds, min_sample_size: usize) -> Self {
        Self {
            thresholds,
            min_sample_size,
        }
    }

    pub fn from_config(config: &MonitoringConfig) -> Self {
        Self::new(config.alert_thresholds, config.sample.min_sample_size)
    }

    pub fn thresholds(&self) -> AlertThresholds {
        self.thresholds
    }

    pub fn classify(
        &self,
        stage: &str,
        current_rate: f64,
        metrics: &StatisticalMetrics,
    ) -> Classification {
        if metrics.sample_size < self.min_sample_size || !current_rate.is_finite() {
            return Classification::unknown(stage);
        }

        let sigma_level = sigma_level(current_rate, metrics);
        let state = self.state_for(sigma_level);
        let rule = match state {
            AndonState::Attention | AndonState::Stop => Some(RULE_SIGMA),
            _ => None,
        };
        Classification {
            stage: stage.to_string(),
            state,
            sigma_level,
            rule,
        }
    }

    fn state_for(&self, sigma_level: f64) -> AndonState {
        if sigma_level >= self.thresholds.stop {
            AndonState::Stop
        } else if sigma_level >= self.thresholds.attention {
            AndonState::Attention
        } else {
            AndonState::Normal
        }
    }
}

/// `|rate - mean| / sd`. With zero spread: 0 at the mean, `+inf` anywhere else.
pub fn sigma_level(current_rate: f64, metrics: &StatisticalMetrics) -> f64 {
    let deviation = (current_rate - metrics.mean).abs();
    if metrics.standard_deviation > 0.0 {
        deviation / metrics.standard_deviation
    } else if deviation == 0.0 {
        0.0
    } else {
        f64::INFINITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn baseline(mean: f64, sd: f64, n: usize) -> StatisticalMetrics {
        StatisticalMetrics::from_moments(mean, sd, n, Utc::now())
    }

    fn classifier() -> Classifier {
        Classifier::new(AlertThresholds::default(), 30)
    }

    #[test]
    fn sigma_thresholds_are_inclusive() {
        let m = baseline(100.0, 10.0, 50);
        let c = classifier();
        assert_eq!(c.classify("checkout", 120.0, &m).state, AndonState::Attention);
        assert_eq!(c.classify("checkout", 130.0, &m).state, AndonState::Stop);
        assert_eq!(c.classify("checkout", 119.9, &m).state, AndonState::Normal);
    }

    #[test]
    fn deviation_below_the_mean_counts() {
        let m = baseline(100.0, 10.0, 50);
        let result = classifier().classify("checkout", 65.0, &m);
        assert_eq!(result.state, AndonState::Stop);
        assert!((result.sigma_level - 3.5).abs() < 1e-12);
        assert_eq!(result.rule, Some(RULE_SIGMA));
    }

    #[test]
    fn zero_spread_guards_division() {
        let m = baseline(0.2, 0.0, 40);
        let same = classifier().classify("payment", 0.2, &m);
        assert_eq!(same.state, AndonState::Normal);
        assert_eq!(same.sigma_level, 0.0);

        let off = classifier().classify("payment", 0.21, &m);
        assert_eq!(off.state, AndonState::Stop);
        assert!(off.sigma_level.is_infinite());
    }

    #[test]
    fn small_sample_is_unknown_whatever_the_rate() {
        let m = baseline(0.1, 0.01, 29);
        let result = classifier().classify("payment", 0.99, &m);
        assert_eq!(result.state, AndonState::Unknown);
        assert_eq!(result.rule, None);
    }
}
