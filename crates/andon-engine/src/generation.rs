//! Engine generation: the immutable stage set built from one `MonitoringConfig`.
//!
//! A config reload never mutates a running generation. It builds a new one and the
//! engine swaps the active pointer.

use std::sync::{Arc, Mutex, MutexGuard, TryLockError};
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};

use andon_core::errors::IngestError;
use andon_core::MonitoringConfig;
use andon_spc::Classifier;

use crate::normalizer::EventNormalizer;
use crate::stage::{StageCell, StageView};

const INITIAL_BACKOFF: Duration = Duration::from_micros(50);
const MAX_BACKOFF: Duration = Duration::from_millis(5);

/// One stage: its writer-owned cell and the last view published from it.
pub struct StageSlot {
    name: String,
    cell: Mutex<StageCell>,
    view: ArcSwap<StageView>,
}

impl StageSlot {
    fn new(name: &str, config: &MonitoringConfig, created: DateTime<Utc>) -> Self {
        let cell = StageCell::new(name, config, created);
        let view = ArcSwap::from_pointee(cell.view());
        Self {
            name: name.to_string(),
            cell: Mutex::new(cell),
            view,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last published view. Never touches the writer lock.
    pub fn view(&self) -> Arc<StageView> {
        self.view.load_full()
    }

    /// Republish the view from a cell the caller holds.
    pub fn publish(&self, cell: &StageCell) {
        self.view.store(Arc::new(cell.view()));
    }

    /// Acquire the writer, giving up at `deadline`.
    pub fn lock_until(&self, deadline: Instant) -> Result<MutexGuard<'_, StageCell>, IngestError> {
        let started = Instant::now();
        let mut backoff = INITIAL_BACKOFF;
        loop {
            match self.cell.try_lock() {
                Ok(guard) => return Ok(guard),
                Err(TryLockError::Poisoned(poisoned)) => return Ok(self.recover(poisoned)),
                Err(TryLockError::WouldBlock) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(IngestError::WriterBusy {
                            stage: self.name.clone(),
                            waited_ms: now.duration_since(started).as_millis() as u64,
                        });
                    }
                    std::thread::sleep(backoff.min(deadline - now));
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                }
            }
        }
    }

    /// Acquire the writer without a deadline. Used by evaluation ticks.
    pub fn lock(&self) -> MutexGuard<'_, StageCell> {
        match self.cell.lock() {
            Ok(guard) => guard,
            Err(poisoned) => self.recover(poisoned),
        }
    }

    fn recover<'a>(
        &self,
        poisoned: std::sync::PoisonError<MutexGuard<'a, StageCell>>,
    ) -> MutexGuard<'a, StageCell> {
        tracing::warn!(stage = %self.name, "stage writer lock poisoned, recovering");
        poisoned.into_inner()
    }
}

impl std::fmt::Debug for StageSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageSlot").field("name", &self.name).finish()
    }
}

/// Everything built from one config: normalizer, classifier, and one slot per stage.
#[derive(Debug)]
pub struct EngineGeneration {
    pub id: u64,
    pub config: Arc<MonitoringConfig>,
    pub normalizer: EventNormalizer,
    pub classifier: Classifier,
    stages: Vec<StageSlot>,
}

impl EngineGeneration {
    /// Build from an already validated config.
    pub fn build(id: u64, config: MonitoringConfig, created: DateTime<Utc>) -> Self {
        let stages = config
            .stages
            .iter()
            .map(|name| StageSlot::new(name, &config, created))
            .collect();
        Self {
            id,
            normalizer: EventNormalizer::from_config(&config),
            classifier: Classifier::from_config(&config),
            config: Arc::new(config),
            stages,
        }
    }

    pub fn stages(&self) -> &[StageSlot] {
        &self.stages
    }

    pub fn stage(&self, index: usize) -> Option<&StageSlot> {
        self.stages.get(index)
    }

    pub fn is_terminal(&self, index: usize) -> bool {
        index + 1 == self.stages.len()
    }

    /// Deadline for a bounded writer wait starting now.
    pub fn writer_deadline(&self) -> Instant {
        Instant::now() + Duration::from_millis(self.config.writer_wait_ms)
    }

    /// Published views in funnel order.
    pub fn views(&self) -> Vec<Arc<StageView>> {
        self.stages.iter().map(StageSlot::view).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use andon_core::AndonState;

    fn generation() -> EngineGeneration {
        let config = MonitoringConfig {
            writer_wait_ms: 20,
            ..MonitoringConfig::with_stages(["landing", "checkout"])
        };
        EngineGeneration::build(1, config, Utc::now())
    }

    #[test]
    fn builds_one_slot_per_stage_in_order() {
        let generation = generation();
        let names: Vec<&str> = generation.stages().iter().map(StageSlot::name).collect();
        assert_eq!(names, ["landing", "checkout"]);
        assert!(generation.is_terminal(1));
        assert!(!generation.is_terminal(0));
        assert!(generation.views().iter().all(|v| v.state == AndonState::Unknown));
    }

    #[test]
    fn held_writer_times_out_with_writer_busy() {
        let generation = generation();
        let slot = generation.stage(0).unwrap();
        let _held = slot.lock();
        let err = slot.lock_until(generation.writer_deadline()).unwrap_err();
        assert!(matches!(err, IngestError::WriterBusy { ref stage, .. } if stage == "landing"));
    }

    #[test]
    fn poisoned_writer_is_recovered() {
        let generation = Arc::new(generation());
        let poisoner = generation.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.stage(1).unwrap().lock();
            panic!("writer died");
        })
        .join();

        let slot = generation.stage(1).unwrap();
        assert!(slot.lock_until(generation.writer_deadline()).is_ok());
        assert_eq!(slot.lock().name(), "checkout");
    }
}
