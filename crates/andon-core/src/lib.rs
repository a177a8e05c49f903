//! # andon-core
//!
//! Foundation crate for the Andon funnel monitor.
//! Defines the event and alert models, monitoring config, errors, constants, and the
//! traits at the engine boundary. Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::MonitoringConfig;
pub use errors::{AndonError, AndonResult, ValidationError};
pub use models::{AndonAlert, AndonDashboard, AndonState, IngestEvent, StatisticalMetrics};
