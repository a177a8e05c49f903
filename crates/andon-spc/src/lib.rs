//! # andon-spc
//!
//! Statistical process control for funnel stages.
//!
//! - [`BaselineTracker`]: hour buckets of Welford accumulators over the lookback window.
//! - [`Classifier`]: sigma level against the baseline, mapped to a raw Andon state.
//! - [`WesternElectricRule2`]: opt-in early warning on 2 of 3 points beyond the attention sigma.
//! - [`HysteresisMachine`]: immediate escalation, K-tick confirmed de-escalation.
//! - [`capability`]: read-only process-capability view and trend estimation.

pub mod baseline;
pub mod capability;
pub mod classifier;
pub mod hysteresis;
pub mod western_electric;

pub use baseline::{BaselineTracker, Observation, RunningStats};
pub use classifier::{Classification, Classifier};
pub use hysteresis::{HysteresisMachine, Transition};
pub use western_electric::WesternElectricRule2;
