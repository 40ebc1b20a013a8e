//! Metadata repository abstraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hybridstore_core::{BackendRole, StoredFileRecord, UploadError, UploadMetadata};
use uuid::Uuid;

/// Row-oriented catalog of stored files, keyed by the record id.
///
/// The repository is deliberately uncoordinated with the blob stores: a row is
/// written after a blob lands, and removed in a separate call after a blob is
/// deleted. Failures in between leave orphaned blobs, which callers accept.
#[async_trait]
pub trait FileRecordRepository: Send + Sync {
    /// Insert a record with its metadata and return the row id.
    async fn insert(
        &self,
        record: &StoredFileRecord,
        metadata: &UploadMetadata,
    ) -> Result<Uuid, UploadError>;

    /// Delete a row by id. Returns whether a row was actually removed.
    async fn delete(&self, id: Uuid) -> Result<bool, UploadError>;

    /// Fetch a record by id.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<StoredFileRecord>, UploadError>;

    /// Count catalogued files, optionally restricted to one backend role.
    async fn count(&self, backend: Option<BackendRole>) -> Result<i64, UploadError>;

    /// Sum of catalogued file sizes in bytes.
    async fn total_size(&self) -> Result<i64, UploadError>;

    /// Timestamp of the most recent upload, if any.
    async fn last_uploaded_at(&self) -> Result<Option<DateTime<Utc>>, UploadError>;
}
