//! # andon-alerts
//!
//! Turns stabilized state transitions into [`AndonAlert`](andon_core::AndonAlert) records.
//!
//! The log is append-only: a new transition supersedes the open alert of its stage but
//! never deletes it. Action status feedback from the external dispatcher is recorded
//! against the alert id and action index.

pub mod actions;
pub mod dispatch;
pub mod manager;
pub mod message;

pub use dispatch::{ChannelDispatcher, DispatchHub};
pub use manager::{AlertManager, TransitionContext};
