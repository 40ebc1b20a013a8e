//! End-to-end failover tests against in-memory backends.

use std::sync::Arc;

use hybridstore_core::{
    BackendRole, UploadError, UploadMetadata, UploadPolicy, UploadRequest,
};
use hybridstore_db::{FileRecordRepository, MemoryFileRecordRepository};
use hybridstore_router::{HybridRouter, UploadOutcome};
use hybridstore_storage::MemoryStore;

fn policy() -> UploadPolicy {
    UploadPolicy {
        max_file_size_bytes: 1024 * 1024,
        allowed_extensions: vec!["txt".to_string(), "pdf".to_string()],
        allowed_content_types: vec!["text/plain".to_string(), "application/pdf".to_string()],
        failure_threshold: 3,
    }
}

fn make_router() -> (
    HybridRouter,
    Arc<MemoryStore>,
    Arc<MemoryStore>,
    Arc<MemoryFileRecordRepository>,
) {
    let primary = Arc::new(MemoryStore::new());
    let secondary = Arc::new(MemoryStore::new());
    let repository = Arc::new(MemoryFileRecordRepository::new());
    let router = HybridRouter::new(
        primary.clone(),
        secondary.clone(),
        repository.clone(),
        policy(),
    );
    (router, primary, secondary, repository)
}

fn text_request(filename: &str) -> UploadRequest {
    UploadRequest::new(filename, "text/plain", b"0123456789".to_vec())
}

#[tokio::test]
async fn test_upload_lands_on_primary() {
    let (router, primary, secondary, repository) = make_router();

    let outcome = router.upload_file(text_request("report.txt")).await.unwrap();

    let record = match outcome {
        UploadOutcome::Primary(record) => record,
        UploadOutcome::Fallback { .. } => panic!("expected primary outcome"),
    };
    assert_eq!(record.backend, BackendRole::Primary);
    assert_eq!(record.filename, "report.txt");
    assert_eq!(record.file_size, 10);
    assert!(record.storage_key.starts_with("uploads/"));
    assert!(record.storage_key.ends_with(".txt"));

    assert!(primary.has_file(&record.storage_key));
    assert!(!secondary.has_file(&record.storage_key));
    assert!(repository
        .get_by_id(record.id)
        .await
        .unwrap()
        .is_some());
    assert!(router.is_primary_available());
    assert_eq!(router.consecutive_primary_failures(), 0);
}

#[tokio::test]
async fn test_single_primary_failure_falls_back() {
    let (router, primary, secondary, _repository) = make_router();
    primary.fail_next("connection timed out");

    let outcome = router.upload_file(text_request("a.txt")).await.unwrap();

    match outcome {
        UploadOutcome::Fallback { record, reason } => {
            assert_eq!(record.backend, BackendRole::Secondary);
            assert!(record.backend_payload.is_none());
            assert!(reason.contains("connection timed out"));
            assert!(secondary.has_file(&record.storage_key));
        }
        UploadOutcome::Primary(_) => panic!("expected fallback outcome"),
    }

    // One failure does not disable the primary.
    assert!(router.is_primary_available());
    assert_eq!(router.consecutive_primary_failures(), 1);
}

#[tokio::test]
async fn test_three_failures_disable_primary() {
    let (router, primary, secondary, _repository) = make_router();
    primary.fail_attempt(1, "outage");
    primary.fail_attempt(2, "outage");
    primary.fail_attempt(3, "outage");

    for i in 0..3 {
        let outcome = router
            .upload_file(text_request(&format!("f{}.txt", i)))
            .await
            .unwrap();
        assert!(matches!(outcome, UploadOutcome::Fallback { .. }));
    }
    assert!(!router.is_primary_available());

    // Fourth upload must not touch the primary at all.
    let outcome = router.upload_file(text_request("f3.txt")).await.unwrap();
    match outcome {
        UploadOutcome::Fallback { reason, .. } => {
            assert!(reason.contains("primary backend disabled"));
        }
        UploadOutcome::Primary(_) => panic!("primary should be skipped"),
    }
    assert_eq!(primary.put_attempts(), 3);
    assert_eq!(secondary.put_attempts(), 4);
}

#[tokio::test]
async fn test_both_backends_fail() {
    let (router, primary, secondary, repository) = make_router();
    primary.fail_next("primary down");
    secondary.fail_next("secondary down");

    let err = router.upload_file(text_request("a.txt")).await.unwrap_err();

    match err {
        UploadError::StorageUnavailable { primary, secondary } => {
            assert!(primary.contains("primary down"));
            assert!(secondary.contains("secondary down"));
        }
        other => panic!("expected StorageUnavailable, got {other:?}"),
    }

    // The failed upload still counts toward the streak but one failure does
    // not trip the threshold.
    assert!(router.is_primary_available());
    assert_eq!(router.consecutive_primary_failures(), 1);
    assert!(repository.is_empty());
}

#[tokio::test]
async fn test_reenable_primary_via_probe() {
    let (router, primary, _secondary, _repository) = make_router();
    for i in 0..3 {
        primary.fail_attempt(i + 1, "outage");
        router
            .upload_file(text_request(&format!("f{}.txt", i)))
            .await
            .unwrap();
    }
    assert!(!router.is_primary_available());

    // Probe failure keeps the primary disabled.
    primary.set_probe_ok(false);
    assert!(!router.reenable_primary().await);
    assert!(!router.is_primary_available());

    // Probe success re-enables it with a clean streak.
    primary.set_probe_ok(true);
    assert!(router.reenable_primary().await);
    assert!(router.is_primary_available());
    assert_eq!(router.consecutive_primary_failures(), 0);

    let outcome = router.upload_file(text_request("after.txt")).await.unwrap();
    assert!(matches!(outcome, UploadOutcome::Primary(_)));
}

#[tokio::test]
async fn test_batch_continues_past_failures() {
    let (router, primary, secondary, repository) = make_router();
    // Second file fails on both backends; first and third succeed on primary.
    primary.fail_attempt(2, "primary glitch");
    secondary.fail_attempt(1, "secondary glitch");

    let requests = vec![
        text_request("a.txt"),
        text_request("b.txt"),
        text_request("c.txt"),
    ];
    let err = router.upload_files(requests).await.unwrap_err();

    match err {
        UploadError::PartialBatch { succeeded, failed } => {
            assert_eq!(succeeded.len(), 2);
            assert_eq!(failed.len(), 1);
            assert_eq!(failed[0].filename, "b.txt");
            // Files that landed are catalogued and stay stored.
            for record in &succeeded {
                assert!(repository.get_by_id(record.id).await.unwrap().is_some());
            }
        }
        other => panic!("expected PartialBatch, got {other:?}"),
    }
    assert_eq!(repository.len(), 2);
}

#[tokio::test]
async fn test_batch_all_success() {
    let (router, _primary, _secondary, repository) = make_router();

    let records = router
        .upload_files(vec![text_request("a.txt"), text_request("b.txt")])
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(repository.len(), 2);
}

#[tokio::test]
async fn test_intermittent_failures_recover_before_threshold() {
    let (router, primary, _secondary, repository) = make_router();
    // Two failures, then the primary recovers on the third attempt.
    primary.fail_attempt(1, "flaky");
    primary.fail_attempt(2, "flaky");

    let metadata = UploadMetadata {
        category: Some("invoices".to_string()),
        description: None,
        tags: vec!["quarterly".to_string()],
    };

    for i in 0..2 {
        let outcome = router
            .upload_file(text_request(&format!("f{}.txt", i)))
            .await
            .unwrap();
        assert!(matches!(outcome, UploadOutcome::Fallback { .. }));
    }
    assert_eq!(router.consecutive_primary_failures(), 2);

    let request = text_request("f2.txt").with_metadata(metadata.clone());
    let outcome = router.upload_file(request).await.unwrap();
    let record = match outcome {
        UploadOutcome::Primary(record) => record,
        UploadOutcome::Fallback { .. } => panic!("expected primary outcome"),
    };

    // Success resets the streak; the primary was never disabled.
    assert!(router.is_primary_available());
    assert_eq!(router.consecutive_primary_failures(), 0);

    let stored = repository.metadata_for(record.id).unwrap();
    assert_eq!(stored.category.as_deref(), Some("invoices"));
    assert_eq!(stored.tags, vec!["quarterly".to_string()]);
}

#[tokio::test]
async fn test_metadata_write_failure_orphans_blob() {
    let (router, primary, _secondary, repository) = make_router();
    repository.fail_next_insert("connection reset");

    let err = router.upload_file(text_request("a.txt")).await.unwrap_err();

    match err {
        UploadError::MetadataWrite { record, reason } => {
            assert!(reason.contains("connection reset"));
            // The blob stays in storage with no catalog row.
            assert!(primary.has_file(&record.storage_key));
            assert!(repository.is_empty());
        }
        other => panic!("expected MetadataWrite, got {other:?}"),
    }
}

#[tokio::test]
async fn test_validation_rejects_before_any_storage_call() {
    let (router, primary, secondary, _repository) = make_router();

    let err = router
        .upload_file(UploadRequest::new("evil.exe", "text/plain", b"x".to_vec()))
        .await
        .unwrap_err();

    assert!(matches!(err, UploadError::Validation(_)));
    assert_eq!(primary.put_attempts(), 0);
    assert_eq!(secondary.put_attempts(), 0);
    // Validation failures never count as backend failures.
    assert_eq!(router.consecutive_primary_failures(), 0);
}

#[tokio::test]
async fn test_delete_dispatches_on_backend() {
    let (router, primary, secondary, _repository) = make_router();

    let primary_record = router
        .upload_file(text_request("a.txt"))
        .await
        .unwrap()
        .into_record();

    primary.fail_next("force fallback");
    let secondary_record = router
        .upload_file(text_request("b.txt"))
        .await
        .unwrap()
        .into_record();
    assert_eq!(secondary_record.backend, BackendRole::Secondary);

    assert!(router.delete_file(&primary_record).await);
    assert!(!primary.has_file(&primary_record.storage_key));

    assert!(router.delete_file(&secondary_record).await);
    assert!(!secondary.has_file(&secondary_record.storage_key));

    // Deleting again is not confirmed.
    assert!(!router.delete_file(&primary_record).await);
}

#[tokio::test]
async fn test_storage_stats_reflect_backend_split() {
    let (router, primary, _secondary, _repository) = make_router();

    router.upload_file(text_request("a.txt")).await.unwrap();
    router.upload_file(text_request("b.txt")).await.unwrap();
    primary.fail_next("glitch");
    router.upload_file(text_request("c.txt")).await.unwrap();

    let stats = router.storage_stats().await.unwrap();
    assert_eq!(stats.total_files, 3);
    assert_eq!(stats.total_size, 30);
    assert_eq!(stats.primary_count, 2);
    assert_eq!(stats.secondary_count, 1);
    assert!(stats.last_sync.is_some());
}

#[tokio::test]
async fn test_storage_stats_zero_primary_while_disabled() {
    let (router, primary, _secondary, _repository) = make_router();

    router.upload_file(text_request("a.txt")).await.unwrap();
    for i in 0..3 {
        primary.fail_next("outage");
        router
            .upload_file(text_request(&format!("f{}.txt", i)))
            .await
            .unwrap();
    }
    assert!(!router.is_primary_available());

    let stats = router.storage_stats().await.unwrap();
    assert_eq!(stats.total_files, 4);
    // The primary row exists in the catalog but is not reported while the
    // backend is disabled.
    assert_eq!(stats.primary_count, 0);
    assert_eq!(stats.secondary_count, 3);
}
