//! # andon-observability
//!
//! Structured logging and operational counters for the Andon monitor.
//!
//! - [`tracing_setup`]: subscriber initialization, named log events, span macros.
//! - [`metrics`]: [`EngineMetrics`] counters, serializable snapshots, Prometheus text.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::{EngineMetrics, MetricsSnapshot};
pub use tracing_setup::{init_tracing, init_tracing_with_filter};
