//! Aggregate error type.

use super::error_code::{self, AndonErrorCode};
use super::{AlertError, ConfigError, IngestError, ValidationError};

/// Top-level error. Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum AndonError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    #[error("Alert error: {0}")]
    Alert(#[from] AlertError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type AndonResult<T> = Result<T, AndonError>;

impl AndonErrorCode for AndonError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Validation(e) => e.error_code(),
            Self::Ingest(e) => e.error_code(),
            Self::Alert(e) => e.error_code(),
            Self::Serialization(_) => error_code::SERIALIZATION_ERROR,
        }
    }
}
