//! In-memory BlobStore implementation for tests and local development.
//!
//! Failures can be scripted per put attempt so failover behavior is testable
//! without a real backend.

use crate::traits::{BlobStore, PutOutcome, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use hybridstore_core::BackendKind;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

/// In-memory store. Blobs live in a map; put attempts are counted so tests
/// can script a failure for a specific attempt.
pub struct MemoryStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
    scripted_failures: Mutex<HashMap<u32, String>>,
    put_attempts: AtomicU32,
    probe_ok: AtomicBool,
    base_url: String,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            scripted_failures: Mutex::new(HashMap::new()),
            put_attempts: AtomicU32::new(0),
            probe_ok: AtomicBool::new(true),
            base_url: "https://mem.example".to_string(),
        }
    }

    /// Script a failure for the next put attempt.
    pub fn fail_next(&self, reason: &str) {
        let next = self.put_attempts.load(Ordering::SeqCst) + 1;
        self.fail_attempt(next, reason);
    }

    /// Script a failure for the n-th put attempt (1-based, counted per store).
    pub fn fail_attempt(&self, attempt: u32, reason: &str) {
        self.scripted_failures
            .lock()
            .unwrap()
            .insert(attempt, reason.to_string());
    }

    /// Make subsequent probes succeed or fail.
    pub fn set_probe_ok(&self, ok: bool) {
        self.probe_ok.store(ok, Ordering::SeqCst);
    }

    /// How many put attempts this store has seen (including scripted failures).
    pub fn put_attempts(&self) -> u32 {
        self.put_attempts.load(Ordering::SeqCst)
    }

    /// Check if a blob exists (for test assertions)
    pub fn has_file(&self, key: &str) -> bool {
        self.files.lock().unwrap().contains_key(key)
    }

    /// Get blob data (for test assertions)
    pub fn get_file(&self, key: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(key).cloned()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn put(
        &self,
        storage_key: &str,
        _content_type: &str,
        data: Bytes,
    ) -> StorageResult<PutOutcome> {
        let attempt = self.put_attempts.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(reason) = self.scripted_failures.lock().unwrap().remove(&attempt) {
            return Err(StorageError::UploadFailed(reason));
        }

        self.files
            .lock()
            .unwrap()
            .insert(storage_key.to_string(), data.to_vec());

        Ok(PutOutcome {
            storage_key: storage_key.to_string(),
            url: format!("{}/{}", self.base_url, storage_key),
            payload: None,
        })
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(storage_key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self.files.lock().unwrap().remove(storage_key).is_some())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self.files.lock().unwrap().contains_key(storage_key))
    }

    async fn probe(&self) -> StorageResult<()> {
        if self.probe_ok.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::BackendError("probe failed".to_string()))
        }
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        let outcome = store
            .put("uploads/a.txt", "text/plain", Bytes::from_static(b"abc"))
            .await
            .unwrap();

        assert_eq!(outcome.storage_key, "uploads/a.txt");
        assert_eq!(store.download("uploads/a.txt").await.unwrap(), b"abc");
        assert!(store.delete("uploads/a.txt").await.unwrap());
        assert!(!store.delete("uploads/a.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_scripted_failure_consumed_once() {
        let store = MemoryStore::new();
        store.fail_next("simulated outage");

        let err = store
            .put("uploads/a.txt", "text/plain", Bytes::from_static(b"abc"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::UploadFailed(_)));

        // Next attempt succeeds
        store
            .put("uploads/a.txt", "text/plain", Bytes::from_static(b"abc"))
            .await
            .unwrap();
        assert_eq!(store.put_attempts(), 2);
    }

    #[tokio::test]
    async fn test_probe_toggle() {
        let store = MemoryStore::new();
        assert!(store.probe().await.is_ok());
        store.set_probe_ok(false);
        assert!(store.probe().await.is_err());
    }
}
