//! Configuration module
//!
//! Env-driven configuration for the storage backends, the metadata database,
//! and the upload policy the router enforces.

use std::env;

use crate::backend::BackendKind;

const DEFAULT_MAX_FILE_SIZE_MB: usize = 50;
const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

/// Upload policy enforced before any backend is attempted.
#[derive(Clone, Debug)]
pub struct UploadPolicy {
    pub max_file_size_bytes: usize,
    pub allowed_extensions: Vec<String>,
    pub allowed_content_types: Vec<String>,
    /// Consecutive primary failures before the primary backend is disabled.
    pub failure_threshold: u32,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_MB * 1024 * 1024,
            allowed_extensions: ["pdf", "doc", "docx", "txt", "jpg", "jpeg", "png"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            allowed_content_types: [
                "application/pdf",
                "application/msword",
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                "text/plain",
                "image/jpeg",
                "image/png",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    // Backend role bindings
    pub primary_backend: BackendKind,
    pub secondary_backend: BackendKind,
    // S3 settings (used by whichever role is bound to S3)
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers
    pub aws_region: Option<String>,
    // Local filesystem settings
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Upload policy
    pub max_file_size_bytes: usize,
    pub allowed_extensions: Vec<String>,
    pub allowed_content_types: Vec<String>,
    pub failure_threshold: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let primary_backend = env::var("PRIMARY_BACKEND")
            .unwrap_or_else(|_| "s3".to_string())
            .parse::<BackendKind>()?;
        let secondary_backend = env::var("SECONDARY_BACKEND")
            .unwrap_or_else(|_| "local".to_string())
            .parse::<BackendKind>()?;

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| DEFAULT_MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(DEFAULT_MAX_FILE_SIZE_MB);

        let defaults = UploadPolicy::default();

        let allowed_extensions = env::var("ALLOWED_EXTENSIONS")
            .map(|s| {
                s.split(',')
                    .map(|e| e.trim().to_lowercase())
                    .filter(|e| !e.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.allowed_extensions);

        let allowed_content_types = env::var("ALLOWED_CONTENT_TYPES")
            .map(|s| {
                s.split(',')
                    .map(|ct| ct.trim().to_lowercase())
                    .filter(|ct| !ct.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.allowed_content_types);

        let config = Config {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            primary_backend,
            secondary_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            aws_region: env::var("AWS_REGION").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            allowed_extensions,
            allowed_content_types,
            failure_threshold: env::var("PRIMARY_FAILURE_THRESHOLD")
                .unwrap_or_else(|_| DEFAULT_FAILURE_THRESHOLD.to_string())
                .parse()
                .unwrap_or(DEFAULT_FAILURE_THRESHOLD),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgresql://")
            && !self.database_url.starts_with("postgres://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.primary_backend == self.secondary_backend {
            return Err(anyhow::anyhow!(
                "PRIMARY_BACKEND and SECONDARY_BACKEND must differ; a fallback to the same store is useless"
            ));
        }

        if self.failure_threshold == 0 {
            return Err(anyhow::anyhow!(
                "PRIMARY_FAILURE_THRESHOLD must be at least 1"
            ));
        }

        for kind in [self.primary_backend, self.secondary_backend] {
            match kind {
                BackendKind::S3 => {
                    if self.s3_bucket.is_none() {
                        return Err(anyhow::anyhow!(
                            "S3_BUCKET must be set when a role uses the s3 backend"
                        ));
                    }
                    if self.s3_region.is_none() && self.aws_region.is_none() {
                        return Err(anyhow::anyhow!(
                            "S3_REGION or AWS_REGION must be set when a role uses the s3 backend"
                        ));
                    }
                }
                BackendKind::Local => {
                    if self.local_storage_path.is_none() {
                        return Err(anyhow::anyhow!(
                            "LOCAL_STORAGE_PATH must be set when a role uses the local backend"
                        ));
                    }
                    if self.local_storage_base_url.is_none() {
                        return Err(anyhow::anyhow!(
                            "LOCAL_STORAGE_BASE_URL must be set when a role uses the local backend"
                        ));
                    }
                }
                BackendKind::Memory => {}
            }
        }

        Ok(())
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.s3_endpoint.as_deref()
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.aws_region.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.local_storage_base_url.as_deref()
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// The policy slice of the config, for handing to the router.
    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy {
            max_file_size_bytes: self.max_file_size_bytes,
            allowed_extensions: self.allowed_extensions.clone(),
            allowed_content_types: self.allowed_content_types.clone(),
            failure_threshold: self.failure_threshold,
        }
    }
}
