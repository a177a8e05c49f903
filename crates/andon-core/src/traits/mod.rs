//! Traits at the engine boundary.

pub mod alert_dispatcher;
pub mod cancellation;
pub mod clock;

pub use alert_dispatcher::IAlertDispatcher;
pub use cancellation::{Cancellable, CancellationToken};
pub use clock::{Clock, ManualClock, SystemClock};
