use crate::models::AndonAlert;

/// External notification dispatcher.
///
/// Receives every alert the engine raises. Delivery, retries, and transport belong to
/// the implementor; outcomes come back through the engine's action-status update.
/// Implementations must not block: the call happens on the evaluation path.
pub trait IAlertDispatcher: Send + Sync {
    fn dispatch(&self, alert: &AndonAlert);

    /// Short name used in logs.
    fn name(&self) -> &str {
        "dispatcher"
    }
}
