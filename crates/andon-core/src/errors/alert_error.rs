//! Alert log errors, raised when dispatcher feedback references something unknown.

use super::error_code::{self, AndonErrorCode};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlertError {
    #[error("alert not found: {alert_id}")]
    AlertNotFound { alert_id: String },

    #[error("alert {alert_id} has {action_count} actions, index {index} is out of range")]
    ActionNotFound {
        alert_id: String,
        index: usize,
        action_count: usize,
    },
}

impl AndonErrorCode for AlertError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::AlertNotFound { .. } => error_code::ALERT_NOT_FOUND,
            Self::ActionNotFound { .. } => error_code::ACTION_NOT_FOUND,
        }
    }
}
