//! Errors returned by engine-level ingestion.

use super::error_code::{self, AndonErrorCode};
use super::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("writer for stage {stage} busy after {waited_ms}ms")]
    WriterBusy { stage: String, waited_ms: u64 },
}

impl AndonErrorCode for IngestError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Invalid(e) => e.error_code(),
            Self::WriterBusy { .. } => error_code::WRITER_BUSY,
        }
    }
}
