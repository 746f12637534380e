/// All errors that can be returned by a key-value backend.
///
/// Record stores never hand these to their callers: a failing backend is
/// logged and the store degrades to its volatile fallback buffer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backend cannot be reached at all (not configured, switched off,
    /// connection refused).
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    /// Reading or writing the file behind a key failed.
    #[error("i/o error on key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The stored blob is not a valid record collection, or the collection
    /// could not be serialized.
    #[error("record collection (de)serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The key is not usable by this backend.
    #[error("invalid storage key '{0}'")]
    InvalidKey(String),
}
