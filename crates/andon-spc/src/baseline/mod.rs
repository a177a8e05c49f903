//! Rolling baseline: exact windowed mean/variance from bucketed Welford accumulators.

pub mod bucket;
pub mod running_stats;
pub mod tracker;

pub use bucket::HourBucket;
pub use running_stats::RunningStats;
pub use tracker::{BaselineTracker, Observation};
