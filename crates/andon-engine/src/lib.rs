//! # andon-engine
//!
//! The Andon funnel monitor.
//!
//! Events pass the [`EventNormalizer`] and are applied to per-stage cells, each owning
//! its rolling baseline, outcome sampler, funnel ledger, and hysteresis machine behind
//! one writer lock. Evaluation ticks classify every stage, stabilize the result, and
//! raise alerts on transitions. Readers take [`AndonEngine::snapshot`] from published
//! stage views without touching writer locks.

pub mod dashboard;
pub mod engine;
pub mod generation;
pub mod ledger;
pub mod normalizer;
pub mod sampler;
pub mod scheduler;
pub mod stage;

pub use engine::{Accepted, AndonEngine, TickReport};
pub use normalizer::{EventNormalizer, NormalizedEvent};
pub use scheduler::TickScheduler;
pub use stage::StageView;
