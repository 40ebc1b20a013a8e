//! Domain models for uploads and stored-file records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::BackendRole;

/// Caller-supplied upload: an owned binary payload with a name, plus optional
/// free-form metadata. Has no identity until persisted.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
    pub metadata: UploadMetadata,
}

impl UploadRequest {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            data,
            metadata: UploadMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: UploadMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Optional upload metadata. Tag order is preserved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadMetadata {
    pub category: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A stored file as catalogued by the metadata repository.
///
/// Created once at the end of a successful upload attempt and never mutated.
/// Exactly one backend role is set per record; `backend_payload` is present
/// only when the primary backend accepted the upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredFileRecord {
    pub id: Uuid,
    pub filename: String,
    pub storage_key: String,
    pub url: String,
    pub content_type: String,
    pub file_size: i64,
    pub uploaded_at: DateTime<Utc>,
    pub backend: BackendRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_payload: Option<serde_json::Value>,
}

/// Best-effort aggregate view of the catalog (see `storage_stats`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageStats {
    pub total_files: i64,
    pub total_size: i64,
    pub primary_count: i64,
    pub secondary_count: i64,
    pub last_sync: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_record(backend: BackendRole) -> StoredFileRecord {
        StoredFileRecord {
            id: Uuid::new_v4(),
            filename: "report.pdf".to_string(),
            storage_key: "uploads/report.pdf".to_string(),
            url: "https://example.com/uploads/report.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            file_size: 2048,
            uploaded_at: Utc::now(),
            backend,
            backend_payload: None,
        }
    }

    #[test]
    fn test_record_serializes_backend_as_lowercase() {
        let record = test_record(BackendRole::Secondary);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["backend"], "secondary");
        // absent payload is omitted entirely
        assert!(json.get("backend_payload").is_none());
    }

    #[test]
    fn test_record_round_trip_with_payload() {
        let mut record = test_record(BackendRole::Primary);
        record.backend_payload = Some(serde_json::json!({"bucket": "docs", "etag": "abc"}));

        let json = serde_json::to_string(&record).unwrap();
        let parsed: StoredFileRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.backend, BackendRole::Primary);
        assert_eq!(parsed.backend_payload, record.backend_payload);
        assert_eq!(parsed.storage_key, record.storage_key);
    }

    #[test]
    fn test_upload_request_builder() {
        let request = UploadRequest::new("notes.txt", "text/plain", b"hello".to_vec())
            .with_metadata(UploadMetadata {
                category: Some("documento".to_string()),
                description: None,
                tags: vec!["teste".to_string()],
            });

        assert_eq!(request.filename, "notes.txt");
        assert_eq!(request.metadata.tags, vec!["teste".to_string()]);
    }
}
