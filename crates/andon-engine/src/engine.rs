//! AndonEngine: ingestion, evaluation ticks, reloads, and dashboard reads.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::Serialize;

use andon_alerts::{AlertManager, DispatchHub, TransitionContext};
use andon_core::errors::{AlertError, ConfigError, IngestError};
use andon_core::models::{ActionStatus, AlertMetrics};
use andon_core::traits::{Cancellable, Clock, IAlertDispatcher, SystemClock};
use andon_core::{AndonAlert, AndonDashboard, IngestEvent, MonitoringConfig, ValidationError};
use andon_observability::tracing_setup::events;
use andon_observability::{ingest_span, stage_eval_span, tick_span, EngineMetrics};
use andon_spc::Classification;

use crate::dashboard;
use crate::generation::EngineGeneration;
use crate::normalizer::{EventNormalizer, NormalizedEvent};
use crate::stage::StageView;

/// Outcome of a successful `submit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Accepted {
    /// Applied to the stage aggregates.
    Applied,
    /// Older than the lookback horizon. Counted and dropped.
    DroppedStale,
    /// Monitoring is switched off in the active config.
    Disabled,
}

/// What one evaluation tick did.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickReport {
    pub generation: u64,
    pub now: DateTime<Utc>,
    /// Stages evaluated on this tick.
    pub evaluated: usize,
    /// Stages already evaluated at or after `now`.
    pub skipped: usize,
    /// Stopped early by cancellation. Stages not reached are untouched.
    pub cancelled: bool,
    pub classifications: Vec<Classification>,
    pub alerts: Vec<AndonAlert>,
}

impl TickReport {
    fn new(generation: u64, now: DateTime<Utc>) -> Self {
        Self {
            generation,
            now,
            evaluated: 0,
            skipped: 0,
            cancelled: false,
            classifications: Vec::new(),
            alerts: Vec::new(),
        }
    }

    pub fn transitions(&self) -> usize {
        self.alerts.len()
    }
}

/// Never-cancelled token for plain `evaluate` calls.
struct NeverCancelled;

impl Cancellable for NeverCancelled {
    fn is_cancelled(&self) -> bool {
        false
    }

    fn cancel(&self) {}
}

/// The funnel monitor.
///
/// Writers (ingestion and ticks) never hold more than one stage lock. Readers only
/// load published views.
pub struct AndonEngine {
    generation: ArcSwap<EngineGeneration>,
    next_generation: AtomicU64,
    alerts: AlertManager,
    hub: DispatchHub,
    metrics: Arc<EngineMetrics>,
    clock: Arc<dyn Clock>,
    /// Latest accepted event timestamp in milliseconds, `i64::MIN` before the first.
    watermark: AtomicI64,
}

impl AndonEngine {
    /// Validate `config` and build generation 1 on the system clock.
    pub fn new(config: MonitoringConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: MonitoringConfig, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        config.validate()?;
        let metrics = Arc::new(EngineMetrics::new());
        let generation = EngineGeneration::build(1, config, clock.now());
        Ok(Self {
            generation: ArcSwap::from_pointee(generation),
            next_generation: AtomicU64::new(2),
            alerts: AlertManager::new(metrics.clone()),
            hub: DispatchHub::new(),
            metrics,
            clock,
            watermark: AtomicI64::new(i64::MIN),
        })
    }

    // ── Ingestion ──────────────────────────────────────────────────────────

    /// Validate and apply one event.
    ///
    /// Blocks on one stage writer at a time, for at most `writer_wait_ms` in total.
    pub fn submit(&self, event: impl Into<IngestEvent>) -> Result<Accepted, IngestError> {
        let event = event.into();
        let generation = self.generation.load_full();
        let _span = ingest_span!(event.stage(), event.kind()).entered();

        if !generation.config.enabled {
            self.metrics.record_disabled();
            return Ok(Accepted::Disabled);
        }

        let now = self.clock.now();
        let normalized = generation
            .normalizer
            .normalize(&event, now)
            .map_err(|e| self.reject(e))?;

        let at = normalized.at();
        let horizon = self.horizon(now);
        let floor = horizon.checked_sub_signed(generation.config.sample.lookback());
        if floor.is_some_and(|floor| at < floor) {
            self.metrics.record_stale();
            events::event_stale(event.stage(), event.session_id(), (horizon - at).num_seconds());
            return Ok(Accepted::DroppedStale);
        }

        if let Err(e) = apply(&generation, &normalized) {
            if matches!(e, IngestError::WriterBusy { .. }) {
                self.metrics.record_writer_busy();
            }
            return Err(e);
        }
        self.watermark.fetch_max(at.timestamp_millis(), Ordering::AcqRel);
        self.metrics.record_accepted();
        Ok(Accepted::Applied)
    }

    /// Parse a JSON payload and submit it.
    pub fn submit_json(&self, payload: &str) -> Result<Accepted, IngestError> {
        let event = EventNormalizer::parse_json(payload).map_err(|e| self.reject(e))?;
        self.submit(event)
    }

    fn reject(&self, error: ValidationError) -> IngestError {
        self.metrics.record_rejected();
        events::event_rejected(&error.field, &error.reason);
        error.into()
    }

    fn horizon(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let watermark = self.watermark.load(Ordering::Acquire);
        if watermark == i64::MIN {
            return now;
        }
        DateTime::from_timestamp_millis(watermark).map_or(now, |latest| latest.max(now))
    }

    // ── Evaluation ─────────────────────────────────────────────────────────

    /// Evaluate every stage at `now`.
    pub fn evaluate(&self, now: DateTime<Utc>) -> TickReport {
        self.evaluate_cancellable(now, &NeverCancelled)
    }

    /// Evaluate every stage at the clock's current instant.
    pub fn evaluate_now(&self) -> TickReport {
        self.evaluate(self.clock.now())
    }

    /// Evaluate stages in funnel order, checking `cancel` before each one.
    ///
    /// Alerts are created under the stage writer and dispatched once every writer of the
    /// tick has been released.
    pub fn evaluate_cancellable(&self, now: DateTime<Utc>, cancel: &dyn Cancellable) -> TickReport {
        let generation = self.generation.load_full();
        let _span = tick_span!(generation.id, now).entered();
        let mut report = TickReport::new(generation.id, now);

        let stages = generation.stages();
        for (position, slot) in stages.iter().enumerate() {
            if cancel.is_cancelled() {
                report.cancelled = true;
                events::tick_cancelled(generation.id, report.evaluated, stages.len() - position);
                break;
            }

            let _stage_span = stage_eval_span!(slot.name()).entered();
            let mut cell = slot.lock();
            let Some(evaluation) = cell.evaluate(now, &generation.classifier) else {
                report.skipped += 1;
                continue;
            };

            let classification = evaluation.classification;
            self.metrics.record_late(evaluation.late);
            self.metrics.set_sigma_level(slot.name(), classification.sigma_level);

            if let Some(transition) = evaluation.transition {
                events::state_transition(
                    slot.name(),
                    transition.from,
                    transition.to,
                    classification.sigma_level,
                );
                let alert = self.alerts.on_transition(
                    TransitionContext {
                        stage: slot.name(),
                        from: transition.from,
                        to: transition.to,
                        rule: classification.rule,
                        metrics: AlertMetrics {
                            current_rate: evaluation.current_rate,
                            sigma_level: classification.sigma_level,
                            baseline: evaluation.baseline,
                        },
                        at: now,
                    },
                    &generation.config.actions,
                );
                report.alerts.push(alert);
            }

            slot.publish(&cell);
            drop(cell);
            report.evaluated += 1;
            report.classifications.push(classification);
        }

        for alert in &report.alerts {
            let failed = self.hub.dispatch(alert);
            for _ in 0..failed {
                self.metrics.record_dispatch_failure();
            }
        }

        if report.cancelled {
            self.metrics.record_tick_cancelled();
        } else {
            self.metrics.record_tick_completed();
            events::tick_completed(
                generation.id,
                report.evaluated,
                report.transitions(),
                report.alerts.len(),
            );
        }
        report
    }

    // ── Reads ──────────────────────────────────────────────────────────────

    /// Dashboard over the published stage views. Never takes a writer lock.
    pub fn snapshot(&self) -> AndonDashboard {
        let generation = self.generation.load_full();
        dashboard::aggregate(&generation, &self.alerts, self.clock.now())
    }

    /// Published view of one stage.
    pub fn stage_view(&self, stage: &str) -> Option<Arc<StageView>> {
        let generation = self.generation.load();
        let index = generation.config.stage_index(stage)?;
        generation.stage(index).map(|slot| slot.view())
    }

    pub fn alerts(&self) -> &AlertManager {
        &self.alerts
    }

    pub fn metrics(&self) -> &Arc<EngineMetrics> {
        &self.metrics
    }

    pub fn config(&self) -> Arc<MonitoringConfig> {
        self.generation.load().config.clone()
    }

    /// Id of the active generation.
    pub fn generation(&self) -> u64 {
        self.generation.load().id
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // ── Control ────────────────────────────────────────────────────────────

    /// Build a new generation from `config` and swap it in. Stage statistics start
    /// over; the alert log is kept.
    pub fn reload(&self, config: MonitoringConfig) -> Result<u64, ConfigError> {
        config.validate()?;
        let id = self.next_generation.fetch_add(1, Ordering::AcqRel);
        let stages = config.stages.clone();
        let next = Arc::new(EngineGeneration::build(id, config, self.clock.now()));
        let previous = self.generation.swap(next);
        self.metrics.retain_stages(&stages);
        events::generation_swapped(previous.id, id, stages.len());
        Ok(id)
    }

    /// Record dispatcher feedback for one action of an alert.
    pub fn update_action_status(
        &self,
        alert_id: &str,
        action_index: usize,
        status: ActionStatus,
    ) -> Result<AndonAlert, AlertError> {
        self.alerts.update_action_status(alert_id, action_index, status)
    }

    pub fn register_dispatcher(&self, dispatcher: Arc<dyn IAlertDispatcher>) {
        self.hub.register(dispatcher);
    }
}

impl std::fmt::Debug for AndonEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AndonEngine")
            .field("generation", &self.generation())
            .field("alerts", &self.alerts.len())
            .field("hub", &self.hub)
            .finish()
    }
}

/// Apply a normalized event, one stage writer at a time.
///
/// A stage event is two independent updates: a conversion on the previous stage and an
/// arrival on its own stage. Each runs under its own writer, which is published and
/// released before the next is taken. A busy writer fails only its half; the other half
/// still lands and the first `WriterBusy` is returned. Both share one deadline.
fn apply(generation: &EngineGeneration, event: &NormalizedEvent) -> Result<(), IngestError> {
    let deadline = generation.writer_deadline();
    let slot = generation
        .stage(event.stage())
        .ok_or_else(|| ValidationError::new("stage", "stage outside the active generation"))?;

    match event {
        NormalizedEvent::Dropoff {
            session_id,
            at,
            value,
            ..
        } => {
            let mut cell = slot.lock_until(deadline)?;
            cell.apply_dropoff(session_id, *at, *value);
            slot.publish(&cell);
            Ok(())
        }
        NormalizedEvent::Arrival {
            stage,
            session_id,
            at,
        } => {
            let converted = match stage.checked_sub(1).and_then(|index| generation.stage(index)) {
                Some(previous) => previous.lock_until(deadline).map(|mut before| {
                    before.apply_conversion(session_id, *at);
                    previous.publish(&before);
                }),
                None => Ok(()),
            };
            let arrived = slot.lock_until(deadline).map(|mut cell| {
                cell.apply_arrival(session_id, *at, generation.is_terminal(*stage));
                slot.publish(&cell);
            });
            converted.and(arrived)
        }
    }
}
