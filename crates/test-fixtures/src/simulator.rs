//! Deterministic funnel traffic for integration tests and benches.
//!
//! Every minute a fixed number of sessions enters the first stage and walks the funnel.
//! At each non-terminal stage a share of the sessions drops off: the baseline rate,
//! multiplied by every anomaly active on that stage and minute, rounded, then shifted
//! by a three-minute jitter cycle so the baseline has spread. No randomness is involved.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use andon_core::models::{DropoffEvent, DropoffType, FunnelStageEvent};
use andon_core::IngestEvent;

/// Milliseconds between a session's consecutive stage events.
const STAGE_STEP_MS: i64 = 100;

/// Added to every stage's dropoff count, indexed by minute modulo the cycle length.
const JITTER: [i64; 3] = [0, 1, -1];

/// Sessions of one minute are spread over this many milliseconds, leaving room for
/// their later stages before the minute ends.
const ENTRY_SPREAD_MS: i64 = 50_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageRate {
    pub stage: String,
    /// Baseline dropoff rate. Ignored for the terminal stage.
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyPattern {
    pub name: String,
    pub stage: String,
    pub start_minute: u32,
    pub duration_minutes: u32,
    /// 1.0 is baseline, 2.0 doubles the dropoff rate.
    pub severity_multiplier: f64,
    #[serde(default = "default_anomaly_dropoff")]
    pub dropoff_type: DropoffType,
    #[serde(default)]
    pub description: String,
}

impl AnomalyPattern {
    pub fn is_active(&self, minute: u32) -> bool {
        minute >= self.start_minute && minute < self.start_minute + self.duration_minutes
    }
}

fn default_anomaly_dropoff() -> DropoffType {
    DropoffType::Error
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    pub name: String,
    /// Funnel in order, first stage first.
    pub stages: Vec<StageRate>,
    #[serde(default)]
    pub anomaly_patterns: Vec<AnomalyPattern>,
    pub duration_minutes: u32,
    pub sessions_per_minute: u32,
    /// Revenue attached to each dropoff.
    #[serde(default)]
    pub dropoff_value: f64,
}

impl SimulationConfig {
    pub fn stage_names(&self) -> Vec<String> {
        self.stages.iter().map(|s| s.stage.clone()).collect()
    }
}

/// Events of one simulated minute, in timestamp order.
#[derive(Debug, Clone)]
pub struct MinuteBatch {
    pub minute: u32,
    pub start: DateTime<Utc>,
    pub events: Vec<IngestEvent>,
}

#[derive(Debug, Clone)]
pub struct FunnelSimulator {
    config: SimulationConfig,
    start: DateTime<Utc>,
}

impl FunnelSimulator {
    pub fn new(config: SimulationConfig, start: DateTime<Utc>) -> Self {
        Self { config, start }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Instant right after the last simulated minute.
    pub fn end(&self) -> DateTime<Utc> {
        self.minute_start(self.config.duration_minutes)
    }

    pub fn minute_start(&self, minute: u32) -> DateTime<Utc> {
        self.start + Duration::minutes(i64::from(minute))
    }

    /// Anomalies active at `minute`.
    pub fn active_anomalies(&self, minute: u32) -> Vec<&AnomalyPattern> {
        self.config
            .anomaly_patterns
            .iter()
            .filter(|a| a.is_active(minute))
            .collect()
    }

    /// Dropoff rate of the stage at position `index` during `minute`, capped at 1.
    pub fn effective_rate(&self, index: usize, minute: u32) -> f64 {
        let Some(stage) = self.config.stages.get(index) else {
            return 0.0;
        };
        let multiplier: f64 = self
            .active_anomalies(minute)
            .iter()
            .filter(|a| a.stage == stage.stage)
            .map(|a| a.severity_multiplier)
            .product();
        (stage.rate * multiplier).clamp(0.0, 1.0)
    }

    /// Generate every minute of the simulation.
    pub fn generate(&self) -> Vec<MinuteBatch> {
        (0..self.config.duration_minutes)
            .map(|minute| self.generate_minute(minute))
            .collect()
    }

    /// Every event of the simulation in timestamp order.
    pub fn events(&self) -> Vec<IngestEvent> {
        self.generate().into_iter().flat_map(|b| b.events).collect()
    }

    fn generate_minute(&self, minute: u32) -> MinuteBatch {
        let stages = &self.config.stages;
        let sessions = self.config.sessions_per_minute;
        let start = self.minute_start(minute);

        // How many sessions reach each stage, and how many of them drop there.
        let jitter = JITTER[minute as usize % JITTER.len()];
        let mut dropping = vec![0_u32; stages.len()];
        let mut reaching = sessions;
        for index in 0..stages.len().saturating_sub(1) {
            let expected = (f64::from(reaching) * self.effective_rate(index, minute)).round() as i64;
            let dropped = (expected + jitter).clamp(0, i64::from(reaching)) as u32;
            dropping[index] = dropped;
            reaching -= dropped;
        }

        let anomaly = self.active_anomalies(minute);
        let mut events = Vec::new();
        let spread = ENTRY_SPREAD_MS / i64::from(sessions.max(1));
        // The last sessions to enter are the ones that drop, stage by stage.
        let mut remaining = sessions;
        for (index, stage) in stages.iter().enumerate() {
            for session in 0..remaining {
                let session_id = format!("{}-{minute}-{session}", self.config.name);
                let entered = start + Duration::milliseconds(i64::from(session) * spread);
                let at = entered + Duration::milliseconds(index as i64 * STAGE_STEP_MS);
                events.push(IngestEvent::Stage(FunnelStageEvent {
                    stage: stage.stage.clone(),
                    timestamp: at,
                    session_id: session_id.clone(),
                    user_id: None,
                    metadata: None,
                }));

                let continuing = remaining - dropping[index];
                if session >= continuing {
                    let dropoff_type = anomaly
                        .iter()
                        .find(|a| a.stage == stage.stage)
                        .map_or(DropoffType::Exit, |a| a.dropoff_type);
                    events.push(IngestEvent::Dropoff(DropoffEvent {
                        session_id,
                        from_stage: stage.stage.clone(),
                        to_stage: None,
                        timestamp: at + Duration::milliseconds(STAGE_STEP_MS / 2),
                        dropoff_type,
                        error_details: None,
                        value: (self.config.dropoff_value > 0.0).then_some(self.config.dropoff_value),
                    }));
                }
            }
            remaining -= dropping[index];
        }

        events.sort_by_key(IngestEvent::timestamp);
        MinuteBatch {
            minute,
            start,
            events,
        }
    }
}
