//! Blob-store abstraction trait
//!
//! This module defines the BlobStore trait that all storage backends must
//! implement. The router never talks to a concrete backend directly.

use async_trait::async_trait;
use bytes::Bytes;
use hybridstore_core::BackendKind;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// What a backend reports after accepting a blob.
///
/// `payload` carries backend-specific detail (bucket, etag, version) when the
/// backend has any; the router attaches it to the stored record when the
/// primary backend accepted the upload.
#[derive(Debug, Clone)]
pub struct PutOutcome {
    pub storage_key: String,
    pub url: String,
    pub payload: Option<serde_json::Value>,
}

/// Blob-store abstraction trait
///
/// All storage backends (S3, local filesystem, in-memory) must implement this
/// trait. The upload router holds one implementation per role and dispatches
/// on the record's backend discriminant.
///
/// **Key format:** `uploads/{file_id}.{ext}`, generated by the `keys` module.
/// Backends receive the key and never invent their own.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store a blob under the given key and return where it landed.
    async fn put(&self, storage_key: &str, content_type: &str, data: Bytes)
        -> StorageResult<PutOutcome>;

    /// Download a blob by its storage key.
    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Delete a blob by its storage key.
    ///
    /// Returns `true` when an object was actually removed and `false` when the
    /// backend reports it already absent. Callers treating `false` as
    /// "not confirmed deleted" is deliberate.
    async fn delete(&self, storage_key: &str) -> StorageResult<bool>;

    /// Check if a blob exists.
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Lightweight connectivity check, used to re-enable a disabled backend.
    async fn probe(&self) -> StorageResult<()>;

    /// Which implementation this store is.
    fn kind(&self) -> BackendKind;
}
