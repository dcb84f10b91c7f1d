/// Errors from byte store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failure inside a backend.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Backend-specific failure (remote store, disk engine, ...).
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
