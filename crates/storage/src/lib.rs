pub mod conformance;
mod error;
mod kv;
mod record;
mod store;
mod traits;

pub use error::StorageError;
pub use kv::{FileKv, MemoryKv};
pub use record::{FeedbackRecord, Recommend, NO_COMMENTS};
pub use store::{KvRecordStore, DEFAULT_KEY};
pub use traits::{KvBackend, RecordStore};
