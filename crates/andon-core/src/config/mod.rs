//! Configuration system for the Andon monitor.
//! TOML-based, 3-layer resolution: env > file > defaults. Immutable once an engine
//! generation is built from it.

pub mod action_config;
pub mod defaults;
pub mod monitoring_config;

pub use action_config::ActionPolicyConfig;
pub use monitoring_config::{AlertThresholds, HysteresisConfig, MonitoringConfig, SampleConfig};
