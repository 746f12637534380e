use async_trait::async_trait;

use crate::error::StorageError;
use crate::record::FeedbackRecord;

/// The external key-value store a record store persists into.
///
/// Both calls may suspend and may fail; callers treat any failure as
/// "backend unavailable". Values are JSON text.
#[async_trait]
pub trait KvBackend: Send + Sync + 'static {
    /// Read the value stored under `key`. `Ok(None)` means nothing has been
    /// stored yet.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the value stored under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Storage for the ordered collection of feedback records.
///
/// ## Get-all / replace-all
///
/// The collection lives under a single key. There is no incremental append
/// at the storage layer: [`append`](RecordStore::append) is fetch, push,
/// replace-all. Two writers racing through `append` can lose an update.
///
/// ## Never failing
///
/// Neither operation returns an error. An unavailable backend reads as an
/// empty collection and a failed write reports `false`; implementations keep
/// the data in a volatile buffer so the caller can carry on.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    /// The persisted collection in submission order, or empty.
    async fn fetch_all(&self) -> Vec<FeedbackRecord>;

    /// Persist `records` as the whole collection. Returns `false` when the
    /// write did not reach durable storage.
    async fn replace_all(&self, records: &[FeedbackRecord]) -> bool;

    /// Append one record to the end of the collection.
    async fn append(&self, record: FeedbackRecord) -> bool {
        let mut records = self.fetch_all().await;
        records.push(record);
        self.replace_all(&records).await
    }
}
