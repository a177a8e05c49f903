//! AndonErrorCode trait for boundary conversion.

/// Every error enum provides a stable code string for callers outside the engine
/// (HTTP handlers, queue consumers).
pub trait AndonErrorCode {
    /// Returns the error code string (e.g., "VALIDATION_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted boundary string: `[ERROR_CODE] message`.
    fn boundary_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

// Error code constants.
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const ALERT_NOT_FOUND: &str = "ALERT_NOT_FOUND";
pub const ACTION_NOT_FOUND: &str = "ACTION_NOT_FOUND";
pub const WRITER_BUSY: &str = "WRITER_BUSY";
pub const SERIALIZATION_ERROR: &str = "SERIALIZATION_ERROR";
