use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::StorageError;
use crate::record::FeedbackRecord;
use crate::traits::{KvBackend, RecordStore};

/// Key the collection is stored under unless configured otherwise.
pub const DEFAULT_KEY: &str = "feedback_responses";

/// A [`RecordStore`] keeping the whole collection as one JSON array under
/// one key of a [`KvBackend`].
///
/// The first time the backend fails (or returns a blob that is not a record
/// collection) the store switches to its volatile fallback buffer for the
/// rest of the process lifetime. A store built with [`volatile`](Self::volatile)
/// starts out in that mode.
///
/// Writes through one store are serialized: [`append`](RecordStore::append)
/// holds the write lock from fetch to replace, so concurrent sessions in the
/// same process never lose each other's records. Separate processes sharing
/// a backend are not coordinated.
pub struct KvRecordStore {
    backend: Option<Arc<dyn KvBackend>>,
    key: String,
    degraded: AtomicBool,
    fallback: Mutex<Vec<FeedbackRecord>>,
    write_lock: Mutex<()>,
}

impl KvRecordStore {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            backend: Some(backend),
            key: DEFAULT_KEY.to_string(),
            degraded: AtomicBool::new(false),
            fallback: Mutex::new(Vec::new()),
            write_lock: Mutex::new(()),
        }
    }

    /// A store with no backend at all; every write is volatile.
    pub fn volatile() -> Self {
        Self {
            backend: None,
            key: DEFAULT_KEY.to_string(),
            degraded: AtomicBool::new(true),
            fallback: Mutex::new(Vec::new()),
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// True once the store has fallen back to its volatile buffer.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }

    fn active_backend(&self) -> Option<&Arc<dyn KvBackend>> {
        if self.is_degraded() {
            None
        } else {
            self.backend.as_ref()
        }
    }

    fn degrade(&self, err: &StorageError) {
        if !self.degraded.swap(true, Ordering::SeqCst) {
            tracing::warn!(
                key = %self.key,
                error = %err,
                "storage unavailable, switching to in-memory fallback"
            );
        }
    }

    async fn fallback_snapshot(&self) -> Vec<FeedbackRecord> {
        self.fallback.lock().await.clone()
    }

    async fn read_backend(
        &self,
        backend: &Arc<dyn KvBackend>,
    ) -> Result<Vec<FeedbackRecord>, StorageError> {
        match backend.get(&self.key).await? {
            None => Ok(Vec::new()),
            Some(blob) => Ok(serde_json::from_str(&blob)?),
        }
    }

    async fn load(&self) -> Vec<FeedbackRecord> {
        let Some(backend) = self.active_backend() else {
            return self.fallback_snapshot().await;
        };
        match self.read_backend(backend).await {
            Ok(records) => records,
            Err(e) => {
                self.degrade(&e);
                self.fallback_snapshot().await
            }
        }
    }

    /// Caller must hold `write_lock`.
    async fn store(&self, records: &[FeedbackRecord]) -> bool {
        if let Some(backend) = self.active_backend() {
            let written = match serde_json::to_string(records) {
                Ok(blob) => backend.set(&self.key, &blob).await,
                Err(e) => Err(e.into()),
            };
            match written {
                Ok(()) => return true,
                Err(e) => {
                    tracing::error!(key = %self.key, error = %e, "failed to persist records");
                    self.degrade(&e);
                }
            }
        }
        *self.fallback.lock().await = records.to_vec();
        false
    }
}

#[async_trait]
impl RecordStore for KvRecordStore {
    async fn fetch_all(&self) -> Vec<FeedbackRecord> {
        self.load().await
    }

    async fn replace_all(&self, records: &[FeedbackRecord]) -> bool {
        let _guard = self.write_lock.lock().await;
        self.store(records).await
    }

    async fn append(&self, record: FeedbackRecord) -> bool {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await;
        records.push(record);
        self.store(&records).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKv;
    use crate::record::Recommend;

    fn record(name: &str) -> FeedbackRecord {
        FeedbackRecord {
            id: Some(format!("id-{}", name)),
            student_name: name.to_string(),
            student_id: format!("S-{}", name),
            program: "MCA".to_string(),
            year: "1".to_string(),
            course_relevance: 7,
            credit_allocation: "appropriate".to_string(),
            content_depth: 5,
            instructor_knowledge: 4,
            clarity_of_instruction: 6,
            library_rating: 5,
            facilities_rating: 3,
            labs_wash_rating: 5,
            overall_satisfaction: 8,
            recommend: Recommend::Yes,
            additional_comments: "fine".to_string(),
            submitted_at: time::macros::datetime!(2025-01-01 00:00 UTC),
        }
    }

    #[tokio::test]
    async fn backend_failure_degrades_to_fallback() {
        let kv = Arc::new(MemoryKv::new());
        let store = KvRecordStore::new(kv.clone());
        assert!(store.append(record("a")).await);

        kv.set_unavailable(true);
        assert!(store.fetch_all().await.is_empty());
        assert!(store.is_degraded());

        // Writes after degradation land in the fallback buffer only.
        assert!(!store.append(record("b")).await);
        let names: Vec<_> = store
            .fetch_all()
            .await
            .into_iter()
            .map(|r| r.student_name)
            .collect();
        assert_eq!(names, vec!["b"]);

        // Degradation is sticky even once the backend recovers.
        kv.set_unavailable(false);
        assert_eq!(store.fetch_all().await.len(), 1);
        let persisted: Vec<FeedbackRecord> =
            serde_json::from_str(&kv.get_raw(DEFAULT_KEY).await.unwrap()).unwrap();
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].student_name, "a");
    }

    #[tokio::test]
    async fn failed_write_keeps_records_in_fallback() {
        let kv = Arc::new(MemoryKv::new());
        let store = KvRecordStore::new(kv.clone());
        assert!(store.fetch_all().await.is_empty());

        kv.set_unavailable(true);
        assert!(!store.replace_all(&[record("a")]).await);
        assert_eq!(store.fetch_all().await.len(), 1);
    }

    #[tokio::test]
    async fn corrupt_blob_is_not_overwritten() {
        let kv = Arc::new(MemoryKv::new());
        kv.put_raw(DEFAULT_KEY, "{not json").await;
        let store = KvRecordStore::new(kv.clone());

        assert!(store.fetch_all().await.is_empty());
        assert!(store.is_degraded());
        assert!(!store.append(record("a")).await);
        assert_eq!(kv.get_raw(DEFAULT_KEY).await.as_deref(), Some("{not json"));
    }

    #[tokio::test]
    async fn volatile_store_never_reports_durable() {
        let store = KvRecordStore::volatile();
        assert!(store.is_degraded());
        assert!(!store.append(record("a")).await);
        assert!(!store.append(record("b")).await);
        assert_eq!(store.fetch_all().await.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_to_file_store_all_persist() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(KvRecordStore::new(Arc::new(crate::kv::FileKv::new(
            dir.path(),
        ))));

        let handles: Vec<_> = (0..40)
            .map(|n| {
                let store = store.clone();
                tokio::spawn(async move { store.append(record(&format!("r{}", n))).await })
            })
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap());
        }

        assert!(!store.is_degraded());
        let reopened = KvRecordStore::new(Arc::new(crate::kv::FileKv::new(dir.path())));
        assert_eq!(reopened.fetch_all().await.len(), 40);
    }

    #[tokio::test]
    async fn custom_key_is_used() {
        let kv = Arc::new(MemoryKv::new());
        let store = KvRecordStore::new(kv.clone()).with_key("survey_2025");
        assert!(store.append(record("a")).await);
        assert!(kv.get_raw("survey_2025").await.is_some());
        assert!(kv.get_raw(DEFAULT_KEY).await.is_none());
    }
}
