//! Runs the record store conformance suite against the bundled backends.

use std::sync::Arc;

use feedback_storage::conformance::run_conformance_suite;
use feedback_storage::{FileKv, KvRecordStore, MemoryKv};

#[tokio::test]
async fn memory_backed_store_conforms() {
    let report =
        run_conformance_suite(|| async { KvRecordStore::new(Arc::new(MemoryKv::new())) }).await;
    assert!(report.total > 0);
    assert!(report.failed == 0, "{report}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn file_backed_store_conforms() {
    let root = tempfile::tempdir().unwrap();
    let counter = std::sync::atomic::AtomicUsize::new(0);
    let report = run_conformance_suite(|| {
        let n = counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let dir = root.path().join(format!("store-{}", n));
        async move { KvRecordStore::new(Arc::new(FileKv::new(dir))) }
    })
    .await;
    assert!(report.failed == 0, "{report}");
}

#[tokio::test]
async fn volatile_store_conforms_on_reads() {
    // Writes to a volatile store report `false`, but reads must still obey
    // the round-trip and ordering rules.
    let report = run_conformance_suite(|| async { KvRecordStore::volatile() }).await;
    let failures: Vec<_> = report
        .results
        .iter()
        .filter(|r| !r.passed)
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(
        failures,
        vec![
            "replace_then_fetch_returns_same",
            "append_to_empty_creates_collection"
        ],
        "{report}"
    );
}

#[tokio::test]
async fn file_store_survives_reopen() {
    use feedback_storage::RecordStore;

    let root = tempfile::tempdir().unwrap();
    let record: feedback_storage::FeedbackRecord = serde_json::from_value(serde_json::json!({
        "id": "r1",
        "studentName": "Asha",
        "studentId": "S1",
        "program": "MCA",
        "year": "2",
        "courseRelevance": 8,
        "creditAllocation": "appropriate",
        "contentDepth": 5,
        "instructorKnowledge": 4,
        "clarityOfInstruction": 7,
        "libraryRating": 6,
        "facilitiesRating": 3,
        "labsWashRating": 5,
        "overallSatisfaction": 8,
        "recommend": "yes",
        "additionalComments": "ok",
        "submittedAt": "2025-03-01T10:15:30Z"
    }))
    .unwrap();

    let first = KvRecordStore::new(Arc::new(FileKv::new(root.path())));
    assert!(first.append(record.clone()).await);
    drop(first);

    let reopened = KvRecordStore::new(Arc::new(FileKv::new(root.path())));
    assert_eq!(reopened.fetch_all().await, vec![record]);
}
