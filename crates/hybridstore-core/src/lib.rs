//! Hybridstore Core Library
//!
//! This crate provides the domain models, error taxonomy, configuration, and
//! upload validation shared across all hybridstore components.

pub mod backend;
pub mod config;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use backend::{BackendKind, BackendRole};
pub use config::{Config, UploadPolicy};
pub use error::{BatchItemFailure, ErrorMetadata, LogLevel, UploadError};
pub use models::{StorageStats, StoredFileRecord, UploadMetadata, UploadRequest};
