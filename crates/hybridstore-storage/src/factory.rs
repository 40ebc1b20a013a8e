#[cfg(feature = "storage-local")]
use crate::LocalStore;
#[cfg(feature = "storage-s3")]
use crate::S3Store;
use crate::{BlobStore, MemoryStore, StorageError, StorageResult};
use hybridstore_core::{BackendKind, Config};
use std::sync::Arc;

/// Create a single storage backend of the given kind from configuration.
pub async fn create_store(kind: BackendKind, config: &Config) -> StorageResult<Arc<dyn BlobStore>> {
    match kind {
        #[cfg(feature = "storage-s3")]
        BackendKind::S3 => {
            let bucket = config
                .s3_bucket()
                .map(String::from)
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config
                .s3_region()
                .map(String::from)
                .or_else(|| config.aws_region().map(String::from))
                .ok_or_else(|| {
                    StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
                })?;
            let endpoint = config.s3_endpoint().map(String::from);

            let store = S3Store::new(bucket, region, endpoint)?;
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "storage-s3"))]
        BackendKind::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        BackendKind::Local => {
            let base_path = config
                .local_storage_path()
                .map(String::from)
                .ok_or_else(|| {
                    StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
                })?;
            let base_url = config
                .local_storage_base_url()
                .map(String::from)
                .ok_or_else(|| {
                    StorageError::ConfigError("LOCAL_STORAGE_BASE_URL not configured".to_string())
                })?;

            let store = LocalStore::new(base_path, base_url).await?;
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "storage-local"))]
        BackendKind::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),

        BackendKind::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}

/// Create the configured (primary, secondary) store pair.
pub async fn create_store_pair(
    config: &Config,
) -> StorageResult<(Arc<dyn BlobStore>, Arc<dyn BlobStore>)> {
    let primary = create_store(config.primary_backend, config).await?;
    let secondary = create_store(config.secondary_backend, config).await?;
    Ok((primary, secondary))
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_store_pair_memory_and_local() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            database_url: "postgresql://localhost/hybridstore".to_string(),
            primary_backend: BackendKind::Memory,
            secondary_backend: BackendKind::Local,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            aws_region: None,
            local_storage_path: Some(dir.path().to_string_lossy().into_owned()),
            local_storage_base_url: Some("http://localhost:4000/files".to_string()),
            max_file_size_bytes: 1024,
            allowed_extensions: vec!["txt".to_string()],
            allowed_content_types: vec!["text/plain".to_string()],
            failure_threshold: 3,
        };

        let (primary, secondary) = create_store_pair(&config).await.unwrap();
        assert_eq!(primary.kind(), BackendKind::Memory);
        assert_eq!(secondary.kind(), BackendKind::Local);
    }

    #[tokio::test]
    async fn test_create_store_rejects_missing_s3_settings() {
        let config = Config {
            database_url: "postgresql://localhost/hybridstore".to_string(),
            primary_backend: BackendKind::S3,
            secondary_backend: BackendKind::Memory,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            aws_region: None,
            local_storage_path: None,
            local_storage_base_url: None,
            max_file_size_bytes: 1024,
            allowed_extensions: vec![],
            allowed_content_types: vec![],
            failure_threshold: 3,
        };

        let result = create_store(BackendKind::S3, &config).await;
        assert!(matches!(result, Err(StorageError::ConfigError(_))));
    }
}
