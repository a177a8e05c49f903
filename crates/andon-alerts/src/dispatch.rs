//! Fan-out of raised alerts to external dispatchers.

use std::sync::{Arc, RwLock};

use tokio::sync::mpsc;

use andon_core::traits::IAlertDispatcher;
use andon_core::AndonAlert;
use andon_observability::tracing_setup::events;

/// Registered dispatchers, called in registration order.
///
/// A dispatcher that panics is caught and logged; later dispatchers still receive the
/// alert and the alert itself stands.
#[derive(Default)]
pub struct DispatchHub {
    dispatchers: RwLock<Vec<Arc<dyn IAlertDispatcher>>>,
}

impl DispatchHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, dispatcher: Arc<dyn IAlertDispatcher>) {
        self.dispatchers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(dispatcher);
    }

    pub fn dispatcher_count(&self) -> usize {
        self.dispatchers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Hand `alert` to every dispatcher. Returns how many of them panicked.
    pub fn dispatch(&self, alert: &AndonAlert) -> usize {
        // Clone the list so a dispatcher may register another without deadlocking.
        let dispatchers = self
            .dispatchers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        let mut failed = 0;
        for dispatcher in &dispatchers {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                dispatcher.dispatch(alert);
            }));
            if let Err(panic) = result {
                failed += 1;
                let reason = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "dispatcher panicked".to_string());
                events::dispatch_failed(dispatcher.name(), &alert.id, &reason);
            }
        }
        failed
    }
}

impl std::fmt::Debug for DispatchHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchHub")
            .field("dispatchers", &self.dispatcher_count())
            .finish()
    }
}

/// Forwards alerts onto an unbounded tokio channel for async consumers.
///
/// Sending never blocks the evaluation path. Once the receiver is dropped, alerts are
/// discarded and logged.
#[derive(Debug, Clone)]
pub struct ChannelDispatcher {
    name: String,
    tx: mpsc::UnboundedSender<AndonAlert>,
}

impl ChannelDispatcher {
    pub fn new(name: impl Into<String>) -> (Self, mpsc::UnboundedReceiver<AndonAlert>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                name: name.into(),
                tx,
            },
            rx,
        )
    }
}

impl IAlertDispatcher for ChannelDispatcher {
    fn dispatch(&self, alert: &AndonAlert) {
        if self.tx.send(alert.clone()).is_err() {
            events::dispatch_failed(&self.name, &alert.id, "receiver dropped");
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
