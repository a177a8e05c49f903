//! Top-level monitoring configuration with 3-layer resolution.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{defaults, ActionPolicyConfig};
use crate::constants::MAX_LOOKBACK_HOURS;
use crate::errors::ConfigError;

/// Sigma thresholds for the control-limit classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    pub attention: f64,
    pub stop: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            attention: defaults::DEFAULT_ATTENTION_SIGMA,
            stop: defaults::DEFAULT_STOP_SIGMA,
        }
    }
}

/// Sampling and windowing parameters for the rolling baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleConfig {
    /// Below this many rate observations a stage is UNKNOWN.
    pub min_sample_size: usize,
    /// Trailing horizon of the baseline.
    pub lookback_hours: u32,
    /// Width of one rate subgroup.
    pub subgroup_secs: u32,
    /// Sealed subgroups with fewer outcomes produce no observation.
    pub min_subgroup_events: u32,
    /// A subgroup is sealed this long after its end, to admit late events.
    pub clock_skew_tolerance_secs: u32,
    /// Events stamped further than this into the future are rejected.
    pub max_future_skew_secs: u32,
}

impl SampleConfig {
    pub fn lookback(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.lookback_hours))
    }
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            min_sample_size: defaults::DEFAULT_MIN_SAMPLE_SIZE,
            lookback_hours: defaults::DEFAULT_LOOKBACK_HOURS,
            subgroup_secs: defaults::DEFAULT_SUBGROUP_SECS,
            min_subgroup_events: defaults::DEFAULT_MIN_SUBGROUP_EVENTS,
            clock_skew_tolerance_secs: defaults::DEFAULT_CLOCK_SKEW_TOLERANCE_SECS,
            max_future_skew_secs: defaults::DEFAULT_MAX_FUTURE_SKEW_SECS,
        }
    }
}

/// De-escalation confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HysteresisConfig {
    /// Consecutive lower ticks required before the stabilized state downgrades.
    pub k: u32,
}

impl Default for HysteresisConfig {
    fn default() -> Self {
        Self {
            k: defaults::DEFAULT_HYSTERESIS_K,
        }
    }
}

/// Static monitoring configuration. Loaded once per engine generation.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`ANDON_*`)
/// 2. TOML file
/// 3. Compiled defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: bool,
    /// Ordered funnel stages. Order defines which stage an arrival converts.
    pub stages: Vec<String>,
    /// Enables Western Electric rule 2 (2 of 3 points beyond the attention sigma).
    pub western_electric: bool,
    /// Bounded wait for a stage writer during ingestion.
    pub writer_wait_ms: u64,
    pub recent_alerts_per_stage: usize,
    pub tick_interval_secs: u64,
    pub alert_thresholds: AlertThresholds,
    pub sample: SampleConfig,
    pub hysteresis: HysteresisConfig,
    pub actions: ActionPolicyConfig,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::DEFAULT_ENABLED,
            stages: defaults::DEFAULT_STAGES.iter().map(|s| s.to_string()).collect(),
            western_electric: defaults::DEFAULT_WESTERN_ELECTRIC,
            writer_wait_ms: defaults::DEFAULT_WRITER_WAIT_MS,
            recent_alerts_per_stage: defaults::DEFAULT_RECENT_ALERTS_PER_STAGE,
            tick_interval_secs: defaults::DEFAULT_TICK_INTERVAL_SECS,
            alert_thresholds: AlertThresholds::default(),
            sample: SampleConfig::default(),
            hysteresis: HysteresisConfig::default(),
            actions: ActionPolicyConfig::default(),
        }
    }
}

impl MonitoringConfig {
    /// Defaults with the given stage list.
    pub fn with_stages<I, S>(stages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            stages: stages.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Load from a TOML file, apply `ANDON_*` overrides, validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let mut config: MonitoringConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string. Does not validate.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }

    /// Apply environment variable overrides.
    /// Pattern: `ANDON_Z_ATTENTION`, `ANDON_Z_STOP`, `ANDON_WE_RULES`, etc.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup. Unparseable values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("ANDON_Z_ATTENTION").and_then(|v| v.parse::<f64>().ok()) {
            self.alert_thresholds.attention = v;
        }
        if let Some(v) = lookup("ANDON_Z_STOP").and_then(|v| v.parse::<f64>().ok()) {
            self.alert_thresholds.stop = v;
        }
        if let Some(v) = lookup("ANDON_WE_RULES").and_then(|v| v.parse::<bool>().ok()) {
            self.western_electric = v;
        }
        if let Some(v) = lookup("ANDON_MIN_SAMPLE_SIZE").and_then(|v| v.parse::<usize>().ok()) {
            self.sample.min_sample_size = v;
        }
        if let Some(v) = lookup("ANDON_LOOKBACK_HOURS").and_then(|v| v.parse::<u32>().ok()) {
            self.sample.lookback_hours = v;
        }
        if let Some(v) = lookup("ANDON_HYSTERESIS_K").and_then(|v| v.parse::<u32>().ok()) {
            self.hysteresis.k = v;
        }
    }

    /// Validate every field. Any failure is fatal at startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stages.is_empty() {
            return Err(invalid("stages", "must list at least one stage"));
        }
        let mut seen = HashSet::new();
        for stage in &self.stages {
            if stage.trim().is_empty() {
                return Err(invalid("stages", "stage identifiers must be non-empty"));
            }
            if !seen.insert(stage.as_str()) {
                return Err(invalid("stages", &format!("duplicate stage '{stage}'")));
            }
        }

        let t = &self.alert_thresholds;
        if !t.attention.is_finite() || t.attention <= 0.0 {
            return Err(invalid("alert_thresholds.attention", "must be a positive number"));
        }
        if !t.stop.is_finite() || t.stop <= 0.0 {
            return Err(invalid("alert_thresholds.stop", "must be a positive number"));
        }
        if t.stop <= t.attention {
            return Err(invalid(
                "alert_thresholds.stop",
                "must be greater than alert_thresholds.attention",
            ));
        }

        if self.sample.min_sample_size == 0 {
            return Err(invalid("sample.min_sample_size", "must be greater than 0"));
        }
        if self.sample.lookback_hours == 0 {
            return Err(invalid("sample.lookback_hours", "must be greater than 0"));
        }
        if self.sample.lookback_hours > MAX_LOOKBACK_HOURS {
            return Err(invalid(
                "sample.lookback_hours",
                &format!("must be at most {MAX_LOOKBACK_HOURS}"),
            ));
        }
        if self.sample.subgroup_secs == 0 {
            return Err(invalid("sample.subgroup_secs", "must be greater than 0"));
        }
        if self.hysteresis.k == 0 {
            return Err(invalid("hysteresis.k", "must be greater than 0"));
        }
        if self.recent_alerts_per_stage == 0 {
            return Err(invalid("recent_alerts_per_stage", "must be greater than 0"));
        }
        if self.tick_interval_secs == 0 {
            return Err(invalid("tick_interval_secs", "must be greater than 0"));
        }
        if let Some(sigma) = self.actions.stop_traffic_min_sigma {
            if !sigma.is_finite() || sigma < 0.0 {
                return Err(invalid(
                    "actions.stop_traffic_min_sigma",
                    "must be a non-negative number",
                ));
            }
        }
        Ok(())
    }

    /// Position of a stage in the funnel.
    pub fn stage_index(&self, stage: &str) -> Option<usize> {
        self.stages.iter().position(|s| s == stage)
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}
