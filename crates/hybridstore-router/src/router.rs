//! Failover upload routing: primary first, secondary on failure.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use hybridstore_core::validation;
use hybridstore_core::{
    BackendRole, BatchItemFailure, StorageStats, StoredFileRecord, UploadError, UploadMetadata,
    UploadPolicy, UploadRequest,
};
use hybridstore_db::FileRecordRepository;
use hybridstore_storage::{generate_storage_key, BlobStore, PutOutcome};
use uuid::Uuid;

/// How an upload landed. Callers branch on this instead of error shape when
/// they care whether the fallback path was taken.
#[derive(Debug, Clone)]
pub enum UploadOutcome {
    /// The primary backend accepted the upload.
    Primary(StoredFileRecord),
    /// The secondary backend accepted the upload after the primary failed or
    /// was disabled. `reason` is the primary's failure reason.
    Fallback {
        record: StoredFileRecord,
        reason: String,
    },
}

impl UploadOutcome {
    pub fn record(&self) -> &StoredFileRecord {
        match self {
            UploadOutcome::Primary(record) => record,
            UploadOutcome::Fallback { record, .. } => record,
        }
    }

    pub fn into_record(self) -> StoredFileRecord {
        match self {
            UploadOutcome::Primary(record) => record,
            UploadOutcome::Fallback { record, .. } => record,
        }
    }
}

/// Hybrid upload router.
///
/// Owns the primary/secondary store pair, the metadata repository, and its
/// availability state. One instance per process is the expected shape; the
/// state lives on the instance, not in a global.
pub struct HybridRouter {
    primary: Arc<dyn BlobStore>,
    secondary: Arc<dyn BlobStore>,
    repository: Arc<dyn FileRecordRepository>,
    policy: UploadPolicy,
    state: crate::state::RouterState,
}

impl HybridRouter {
    pub fn new(
        primary: Arc<dyn BlobStore>,
        secondary: Arc<dyn BlobStore>,
        repository: Arc<dyn FileRecordRepository>,
        policy: UploadPolicy,
    ) -> Self {
        Self {
            primary,
            secondary,
            repository,
            policy,
            state: crate::state::RouterState::new(),
        }
    }

    pub fn is_primary_available(&self) -> bool {
        self.state.is_primary_available()
    }

    pub fn consecutive_primary_failures(&self) -> u32 {
        self.state.consecutive_failures()
    }

    /// Upload one file: primary backend first while available, secondary as
    /// fallback, metadata row after either success.
    pub async fn upload_file(
        &self,
        request: UploadRequest,
    ) -> Result<UploadOutcome, UploadError> {
        let (safe_filename, extension) = validation::validate_request(&request, &self.policy)?;

        let file_id = Uuid::new_v4();
        let storage_key = generate_storage_key(file_id, &extension);
        let data = Bytes::from(request.data);
        let file_size = data.len() as i64;

        tracing::info!(
            file_id = %file_id,
            filename = %safe_filename,
            size_bytes = file_size,
            "Processing upload"
        );

        let mut primary_reason: Option<String> = None;

        if self.state.is_primary_available() {
            match self
                .primary
                .put(&storage_key, &request.content_type, data.clone())
                .await
            {
                Ok(outcome) => {
                    self.state.record_primary_success();
                    let record = build_record(
                        file_id,
                        &safe_filename,
                        &request.content_type,
                        file_size,
                        BackendRole::Primary,
                        outcome,
                    );
                    let record = self.persist(record, &request.metadata).await?;
                    return Ok(UploadOutcome::Primary(record));
                }
                Err(e) => {
                    let failures = self
                        .state
                        .record_primary_failure(self.policy.failure_threshold);
                    if failures >= self.policy.failure_threshold {
                        tracing::warn!(
                            error = %e,
                            consecutive_failures = failures,
                            "Primary backend disabled after repeated failures"
                        );
                    } else {
                        tracing::warn!(
                            error = %e,
                            consecutive_failures = failures,
                            "Primary backend upload failed; falling back to secondary"
                        );
                    }
                    primary_reason = Some(e.to_string());
                }
            }
        } else {
            tracing::debug!(file_id = %file_id, "Primary backend disabled; using secondary");
        }

        let primary_reason =
            primary_reason.unwrap_or_else(|| "primary backend disabled".to_string());

        match self
            .secondary
            .put(&storage_key, &request.content_type, data)
            .await
        {
            Ok(outcome) => {
                // Secondary records never carry a backend payload.
                let outcome = PutOutcome {
                    payload: None,
                    ..outcome
                };
                let record = build_record(
                    file_id,
                    &safe_filename,
                    &request.content_type,
                    file_size,
                    BackendRole::Secondary,
                    outcome,
                );
                let record = self.persist(record, &request.metadata).await?;
                Ok(UploadOutcome::Fallback {
                    record,
                    reason: primary_reason,
                })
            }
            Err(e) => {
                tracing::error!(
                    file_id = %file_id,
                    primary_error = %primary_reason,
                    secondary_error = %e,
                    "Both storage backends failed"
                );
                Err(UploadError::StorageUnavailable {
                    primary: primary_reason,
                    secondary: e.to_string(),
                })
            }
        }
    }

    /// Upload a batch, strictly sequentially. Continues through individual
    /// failures; any failure turns the whole call into `PartialBatch`, but
    /// files that did land stay uploaded and catalogued.
    pub async fn upload_files(
        &self,
        requests: Vec<UploadRequest>,
    ) -> Result<Vec<StoredFileRecord>, UploadError> {
        let mut succeeded = Vec::new();
        let mut failed = Vec::new();

        for request in requests {
            let filename = request.filename.clone();
            match self.upload_file(request).await {
                Ok(outcome) => succeeded.push(outcome.into_record()),
                Err(e) => failed.push(BatchItemFailure {
                    filename,
                    reason: e.to_string(),
                }),
            }
        }

        if failed.is_empty() {
            Ok(succeeded)
        } else {
            Err(UploadError::PartialBatch { succeeded, failed })
        }
    }

    /// Delete the blob behind a record, dispatching on its backend
    /// discriminant. Returns `false` for "not confirmed deleted" (already
    /// absent, or the backend call failed); removing the metadata row is the
    /// caller's separate responsibility.
    pub async fn delete_file(&self, record: &StoredFileRecord) -> bool {
        let store = match record.backend {
            BackendRole::Primary => &self.primary,
            BackendRole::Secondary => &self.secondary,
        };

        match store.delete(&record.storage_key).await {
            Ok(true) => true,
            Ok(false) => {
                tracing::warn!(
                    record_id = %record.id,
                    key = %record.storage_key,
                    backend = %record.backend,
                    "Object already absent on delete"
                );
                false
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    record_id = %record.id,
                    key = %record.storage_key,
                    backend = %record.backend,
                    "Delete not confirmed"
                );
                false
            }
        }
    }

    /// Best-effort aggregate view of the catalog. While the primary backend
    /// is disabled its count is reported as 0 instead of reading it.
    pub async fn storage_stats(&self) -> Result<StorageStats, UploadError> {
        let total_files = self.repository.count(None).await?;
        let total_size = self.repository.total_size().await?;
        let primary_count = if self.state.is_primary_available() {
            self.repository.count(Some(BackendRole::Primary)).await?
        } else {
            0
        };
        let secondary_count = self.repository.count(Some(BackendRole::Secondary)).await?;
        let last_sync = self.repository.last_uploaded_at().await?;

        Ok(StorageStats {
            total_files,
            total_size,
            primary_count,
            secondary_count,
            last_sync,
        })
    }

    /// Probe the primary backend and re-enable it on success. This is the
    /// only recovery path after the failure threshold trips; there is no
    /// timed retry. Returns whether the primary is available afterwards.
    pub async fn reenable_primary(&self) -> bool {
        match self.primary.probe().await {
            Ok(()) => {
                self.state.reenable();
                tracing::info!("Primary backend re-enabled");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Primary probe failed; backend stays disabled");
                false
            }
        }
    }

    /// Catalog the record; a failed write surfaces as `MetadataWrite` and the
    /// already-uploaded blob is left in place (orphaned, by policy).
    async fn persist(
        &self,
        record: StoredFileRecord,
        metadata: &UploadMetadata,
    ) -> Result<StoredFileRecord, UploadError> {
        match self.repository.insert(&record, metadata).await {
            Ok(_) => Ok(record),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    record_id = %record.id,
                    key = %record.storage_key,
                    backend = %record.backend,
                    "Blob stored but metadata write failed; blob is orphaned"
                );
                Err(UploadError::MetadataWrite {
                    record: Box::new(record),
                    reason: e.to_string(),
                })
            }
        }
    }
}

fn build_record(
    file_id: Uuid,
    filename: &str,
    content_type: &str,
    file_size: i64,
    backend: BackendRole,
    outcome: PutOutcome,
) -> StoredFileRecord {
    StoredFileRecord {
        id: file_id,
        filename: filename.to_string(),
        storage_key: outcome.storage_key,
        url: outcome.url,
        content_type: content_type.to_string(),
        file_size,
        uploaded_at: Utc::now(),
        backend,
        backend_payload: outcome.payload,
    }
}
