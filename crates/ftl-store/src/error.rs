/// Errors from key-value store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store reported a failure.
    #[error("backend error: {0}")]
    Backend(String),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A lock guarding in-memory state was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    LockPoisoned,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
