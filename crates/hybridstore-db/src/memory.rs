//! In-memory FileRecordRepository for tests.
//!
//! Insert failures can be scripted so the orphaned-blob path (blob stored,
//! metadata write failed) is testable.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hybridstore_core::{BackendRole, StoredFileRecord, UploadError, UploadMetadata};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use uuid::Uuid;

use crate::traits::FileRecordRepository;

#[derive(Default)]
pub struct MemoryFileRecordRepository {
    rows: Mutex<HashMap<Uuid, (StoredFileRecord, UploadMetadata)>>,
    insert_failures: Mutex<VecDeque<String>>,
}

impl MemoryFileRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a failure for the next insert.
    pub fn fail_next_insert(&self, reason: &str) {
        self.insert_failures
            .lock()
            .unwrap()
            .push_back(reason.to_string());
    }

    /// Number of rows currently in the catalog (for test assertions).
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Metadata stored for a record (for test assertions).
    pub fn metadata_for(&self, id: Uuid) -> Option<UploadMetadata> {
        self.rows.lock().unwrap().get(&id).map(|(_, m)| m.clone())
    }
}

#[async_trait]
impl FileRecordRepository for MemoryFileRecordRepository {
    async fn insert(
        &self,
        record: &StoredFileRecord,
        metadata: &UploadMetadata,
    ) -> Result<Uuid, UploadError> {
        if let Some(reason) = self.insert_failures.lock().unwrap().pop_front() {
            return Err(UploadError::Repository(reason));
        }
        self.rows
            .lock()
            .unwrap()
            .insert(record.id, (record.clone(), metadata.clone()));
        Ok(record.id)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, UploadError> {
        Ok(self.rows.lock().unwrap().remove(&id).is_some())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<StoredFileRecord>, UploadError> {
        Ok(self.rows.lock().unwrap().get(&id).map(|(r, _)| r.clone()))
    }

    async fn count(&self, backend: Option<BackendRole>) -> Result<i64, UploadError> {
        let rows = self.rows.lock().unwrap();
        let count = match backend {
            Some(role) => rows.values().filter(|(r, _)| r.backend == role).count(),
            None => rows.len(),
        };
        Ok(count as i64)
    }

    async fn total_size(&self) -> Result<i64, UploadError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.values().map(|(r, _)| r.file_size).sum())
    }

    async fn last_uploaded_at(&self) -> Result<Option<DateTime<Utc>>, UploadError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.values().map(|(r, _)| r.uploaded_at).max())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(backend: BackendRole, size: i64) -> StoredFileRecord {
        StoredFileRecord {
            id: Uuid::new_v4(),
            filename: "a.txt".to_string(),
            storage_key: "uploads/a.txt".to_string(),
            url: "https://mem.example/uploads/a.txt".to_string(),
            content_type: "text/plain".to_string(),
            file_size: size,
            uploaded_at: Utc::now(),
            backend,
            backend_payload: None,
        }
    }

    #[tokio::test]
    async fn test_insert_count_and_aggregates() {
        let repo = MemoryFileRecordRepository::new();
        let metadata = UploadMetadata::default();

        repo.insert(&record(BackendRole::Primary, 10), &metadata)
            .await
            .unwrap();
        repo.insert(&record(BackendRole::Secondary, 20), &metadata)
            .await
            .unwrap();

        assert_eq!(repo.count(None).await.unwrap(), 2);
        assert_eq!(repo.count(Some(BackendRole::Primary)).await.unwrap(), 1);
        assert_eq!(repo.total_size().await.unwrap(), 30);
        assert!(repo.last_uploaded_at().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_reports_absence() {
        let repo = MemoryFileRecordRepository::new();
        let r = record(BackendRole::Primary, 10);
        repo.insert(&r, &UploadMetadata::default()).await.unwrap();

        assert!(repo.delete(r.id).await.unwrap());
        assert!(!repo.delete(r.id).await.unwrap());
        assert!(repo.get_by_id(r.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_scripted_insert_failure() {
        let repo = MemoryFileRecordRepository::new();
        repo.fail_next_insert("connection reset");

        let err = repo
            .insert(&record(BackendRole::Primary, 10), &UploadMetadata::default())
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Repository(_)));
        assert!(repo.is_empty());
    }
}
