//! Hybridstore Storage Library
//!
//! This crate provides the blob-store abstraction consumed by the upload
//! router, plus implementations for S3-compatible object storage, the local
//! filesystem, and an in-memory store for tests and development.
//!
//! # Storage key format
//!
//! Every stored object uses the key layout `uploads/{file_id}.{ext}` so keys
//! stay identical across backends: a record that falls back to the secondary
//! store keeps the exact key the primary would have used. Keys must not
//! contain `..` or a leading `/`. Key generation is centralized in the `keys`
//! module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::{create_store, create_store_pair};
pub use hybridstore_core::BackendKind;
pub use keys::generate_storage_key;
#[cfg(feature = "storage-local")]
pub use local::LocalStore;
pub use memory::MemoryStore;
#[cfg(feature = "storage-s3")]
pub use s3::S3Store;
pub use traits::{BlobStore, PutOutcome, StorageError, StorageResult};
