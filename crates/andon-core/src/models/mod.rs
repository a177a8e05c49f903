//! Data model shared by every subsystem.

pub mod alert;
pub mod andon_state;
pub mod capability;
pub mod dashboard;
pub mod events;
pub mod funnel_metrics;
pub mod statistical_metrics;

pub use alert::{ActionStatus, ActionType, AlertAction, AlertMetrics, AndonAlert};
pub use andon_state::AndonState;
pub use capability::{Capability, ProcessCapability, Trend};
pub use dashboard::{AndonDashboard, DashboardSummary, StageStatus};
pub use events::{DropoffEvent, DropoffType, FunnelStageEvent, IngestEvent};
pub use funnel_metrics::FunnelMetrics;
pub use statistical_metrics::StatisticalMetrics;
