//! Error handling for the Andon monitor.
//! One error enum per subsystem, `thiserror` only.

pub mod alert_error;
pub mod andon_error;
pub mod config_error;
pub mod error_code;
pub mod ingest_error;
pub mod validation_error;

pub use alert_error::AlertError;
pub use andon_error::{AndonError, AndonResult};
pub use config_error::ConfigError;
pub use error_code::AndonErrorCode;
pub use ingest_error::IngestError;
pub use validation_error::ValidationError;
