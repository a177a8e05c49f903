//! Per-stage aggregate: the single mutable unit behind one writer lock.

use chrono::{DateTime, Utc};
use serde::Serialize;

use andon_core::config::AlertThresholds;
use andon_core::models::{FunnelMetrics, ProcessCapability};
use andon_core::{AndonState, MonitoringConfig, StatisticalMetrics};
use andon_spc::{
    capability, BaselineTracker, Classification, Classifier, HysteresisMachine, Transition,
    WesternElectricRule2,
};

use crate::ledger::FunnelLedger;
use crate::sampler::{OutcomeSampler, Outcome};

/// Immutable view of a stage, republished after every write.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageView {
    pub name: String,
    /// Stabilized state.
    pub state: AndonState,
    /// Raw classification of the last tick.
    pub raw_state: AndonState,
    pub funnel: FunnelMetrics,
    pub baseline: StatisticalMetrics,
    pub current_rate: Option<f64>,
    pub sigma_level: f64,
    pub capability: Option<ProcessCapability>,
    pub evaluated_at: Option<DateTime<Utc>>,
}

/// Result of evaluating one stage on a tick.
#[derive(Debug, Clone)]
pub struct StageEvaluation {
    pub classification: Classification,
    pub transition: Option<Transition>,
    pub current_rate: f64,
    pub baseline: StatisticalMetrics,
    /// Outcomes folded into a later subgroup since the previous tick.
    pub late: u64,
}

pub struct StageCell {
    name: String,
    tracker: BaselineTracker,
    sampler: OutcomeSampler,
    ledger: FunnelLedger,
    machine: HysteresisMachine,
    western_electric: Option<WesternElectricRule2>,
    thresholds: AlertThresholds,
    current: Option<(DateTime<Utc>, f64)>,
    baseline: StatisticalMetrics,
    last: Classification,
    capability: Option<ProcessCapability>,
    late: u64,
}

impl StageCell {
    pub fn new(name: &str, config: &MonitoringConfig, created: DateTime<Utc>) -> Self {
        let lookback = config.sample.lookback();
        Self {
            name: name.to_string(),
            tracker: BaselineTracker::new(lookback),
            sampler: OutcomeSampler::new(&config.sample),
            ledger: FunnelLedger::new(lookback),
            machine: HysteresisMachine::new(config.hysteresis.k),
            western_electric: config
                .western_electric
                .then(|| WesternElectricRule2::new(config.alert_thresholds.attention)),
            thresholds: config.alert_thresholds,
            current: None,
            baseline: StatisticalMetrics::empty(created),
            last: Classification::unknown(name),
            capability: None,
            late: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> AndonState {
        self.machine.state()
    }

    /// A session reached this stage. The terminal stage counts it as converted.
    pub fn apply_arrival(&mut self, session_id: &str, at: DateTime<Utc>, terminal: bool) {
        self.ledger.record_arrival(session_id, at);
        if terminal {
            self.apply_conversion(session_id, at);
        }
    }

    /// A session moved on from this stage to the next one.
    pub fn apply_conversion(&mut self, session_id: &str, at: DateTime<Utc>) {
        self.ledger.record_conversion(session_id, at);
        if self.sampler.record(at, Outcome::Conversion) {
            self.late += 1;
        }
    }

    pub fn apply_dropoff(&mut self, session_id: &str, at: DateTime<Utc>, value: f64) {
        self.ledger.record_dropoff(session_id, at, value);
        if self.sampler.record(at, Outcome::Dropoff) {
            self.late += 1;
        }
    }

    /// One evaluation tick. `None` when `now` is not after the previous tick, which
    /// leaves the cell untouched.
    pub fn evaluate(&mut self, now: DateTime<Utc>, classifier: &Classifier) -> Option<StageEvaluation> {
        if self.machine.last_evaluated().is_some_and(|last| now <= last) {
            return None;
        }

        for subgroup in self.sampler.seal(now) {
            let rate = subgroup.dropoff_rate();
            self.tracker.record(subgroup.start, rate);
            self.current = Some((subgroup.start, rate));
        }
        self.tracker.roll(now);
        self.ledger.roll(now);
        self.baseline = self.tracker.recompute_control_limits(now);

        let mut classification = match self.current {
            Some((_, rate)) => classifier.classify(&self.name, rate, &self.baseline),
            None => Classification::unknown(&self.name),
        };
        if let (Some(rule), Some((observed_at, _))) = (self.western_electric.as_mut(), self.current) {
            classification = rule.apply(observed_at, classification);
        }

        let transition = self.machine.observe(now, classification.state);
        let current_rate = self.current.map_or(0.0, |(_, rate)| rate);
        self.capability = (classification.state != AndonState::Unknown).then(|| {
            capability::assess(
                &self.name,
                &self.baseline,
                current_rate,
                classification.sigma_level,
                &self.tracker.recent_values(),
                &self.thresholds,
            )
        });
        self.last = classification.clone();

        Some(StageEvaluation {
            classification,
            transition,
            current_rate,
            baseline: self.baseline.clone(),
            late: std::mem::take(&mut self.late),
        })
    }

    pub fn view(&self) -> StageView {
        StageView {
            name: self.name.clone(),
            state: self.machine.state(),
            raw_state: self.last.state,
            funnel: self.ledger.metrics(&self.name),
            baseline: self.baseline.clone(),
            current_rate: self.current.map(|(_, rate)| rate),
            sigma_level: self.last.sigma_level,
            capability: self.capability.clone(),
            evaluated_at: self.machine.last_evaluated(),
        }
    }
}

impl std::fmt::Debug for StageCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageCell")
            .field("name", &self.name)
            .field("state", &self.machine.state())
            .field("sample_size", &self.tracker.sample_size())
            .finish()
    }
}
