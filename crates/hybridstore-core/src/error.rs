//! Error types module
//!
//! This module provides the error taxonomy that crosses the upload router's
//! boundary. Per-backend failures are classified inside the router and only
//! surface here when both backends have failed for a file.

use crate::models::StoredFileRecord;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error reporting - defines how an error should be presented.
/// This trait allows errors to self-describe their severity and retryability.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "STORAGE_UNAVAILABLE")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// One failed file inside a batch upload.
#[derive(Debug, Clone)]
pub struct BatchItemFailure {
    pub filename: String,
    pub reason: String,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Invalid upload: {0}")]
    Validation(String),

    #[error("All storage backends failed (primary: {primary}; secondary: {secondary})")]
    StorageUnavailable { primary: String, secondary: String },

    #[error("Batch upload partially failed: {} file(s) failed", .failed.len())]
    PartialBatch {
        succeeded: Vec<StoredFileRecord>,
        failed: Vec<BatchItemFailure>,
    },

    #[error("File stored but metadata write failed: {reason}")]
    MetadataWrite {
        record: Box<StoredFileRecord>,
        reason: String,
    },

    #[error("Metadata repository error: {0}")]
    Repository(String),
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for UploadError {
    fn from(err: sqlx::Error) -> Self {
        UploadError::Repository(err.to_string())
    }
}

/// Static metadata per variant: (error_code, recoverable, log_level).
fn upload_error_static_metadata(err: &UploadError) -> (&'static str, bool, LogLevel) {
    match err {
        UploadError::Validation(_) => ("INVALID_UPLOAD", false, LogLevel::Debug),
        UploadError::StorageUnavailable { .. } => ("STORAGE_UNAVAILABLE", true, LogLevel::Error),
        UploadError::PartialBatch { .. } => ("PARTIAL_BATCH_FAILURE", true, LogLevel::Warn),
        UploadError::MetadataWrite { .. } => ("METADATA_WRITE_FAILED", true, LogLevel::Error),
        UploadError::Repository(_) => ("REPOSITORY_ERROR", true, LogLevel::Error),
    }
}

impl ErrorMetadata for UploadError {
    fn error_code(&self) -> &'static str {
        upload_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        upload_error_static_metadata(self).1
    }

    fn log_level(&self) -> LogLevel {
        upload_error_static_metadata(self).2
    }
}
