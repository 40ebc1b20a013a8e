//! File record repository: CRUD and aggregates for the file_records table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hybridstore_core::{BackendRole, StoredFileRecord, UploadError, UploadMetadata};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::traits::FileRecordRepository;

/// Row type for the file_records table (for FromRow).
#[derive(Debug, sqlx::FromRow)]
pub struct FileRecordRow {
    pub id: Uuid,
    pub filename: String,
    pub storage_key: String,
    pub url: String,
    pub content_type: String,
    pub file_size: i64,
    pub uploaded_at: DateTime<Utc>,
    pub backend: BackendRole,
    pub backend_payload: Option<serde_json::Value>,
}

impl FileRecordRow {
    pub fn to_record(self) -> StoredFileRecord {
        StoredFileRecord {
            id: self.id,
            filename: self.filename,
            storage_key: self.storage_key,
            url: self.url,
            content_type: self.content_type,
            file_size: self.file_size,
            uploaded_at: self.uploaded_at,
            backend: self.backend,
            backend_payload: self.backend_payload,
        }
    }
}

const RECORD_COLUMNS: &str =
    "id, filename, storage_key, url, content_type, file_size, uploaded_at, backend, backend_payload";

/// Postgres-backed repository for the file_records table.
#[derive(Clone)]
pub struct PgFileRecordRepository {
    pool: PgPool,
}

impl PgFileRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileRecordRepository for PgFileRecordRepository {
    #[tracing::instrument(skip(self, record, metadata), fields(db.table = "file_records", record_id = %record.id))]
    async fn insert(
        &self,
        record: &StoredFileRecord,
        metadata: &UploadMetadata,
    ) -> Result<Uuid, UploadError> {
        let id: Uuid = sqlx::query_scalar::<Postgres, Uuid>(
            r#"
            INSERT INTO file_records
                (id, filename, storage_key, url, content_type, file_size,
                 uploaded_at, backend, backend_payload, category, description, tags)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            "#,
        )
        .bind(record.id)
        .bind(&record.filename)
        .bind(&record.storage_key)
        .bind(&record.url)
        .bind(&record.content_type)
        .bind(record.file_size)
        .bind(record.uploaded_at)
        .bind(record.backend)
        .bind(&record.backend_payload)
        .bind(&metadata.category)
        .bind(&metadata.description)
        .bind(&metadata.tags)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    #[tracing::instrument(skip(self), fields(db.table = "file_records", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<bool, UploadError> {
        let result = sqlx::query("DELETE FROM file_records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "file_records", db.record_id = %id))]
    async fn get_by_id(&self, id: Uuid) -> Result<Option<StoredFileRecord>, UploadError> {
        let row: Option<FileRecordRow> = sqlx::query_as::<Postgres, FileRecordRow>(&format!(
            "SELECT {} FROM file_records WHERE id = $1",
            RECORD_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| r.to_record()))
    }

    #[tracing::instrument(skip(self), fields(db.table = "file_records"))]
    async fn count(&self, backend: Option<BackendRole>) -> Result<i64, UploadError> {
        let count: i64 = match backend {
            Some(role) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM file_records WHERE backend = $1")
                    .bind(role)
                    .fetch_one(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM file_records")
                    .fetch_one(&self.pool)
                    .await?
            }
        };
        Ok(count)
    }

    #[tracing::instrument(skip(self), fields(db.table = "file_records"))]
    async fn total_size(&self) -> Result<i64, UploadError> {
        let total: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(file_size), 0)::BIGINT FROM file_records")
                .fetch_one(&self.pool)
                .await?;
        Ok(total)
    }

    #[tracing::instrument(skip(self), fields(db.table = "file_records"))]
    async fn last_uploaded_at(&self) -> Result<Option<DateTime<Utc>>, UploadError> {
        let last: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT MAX(uploaded_at) FROM file_records")
                .fetch_one(&self.pool)
                .await?;
        Ok(last)
    }
}
