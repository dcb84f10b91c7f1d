use vws_store::StoreError;
use vws_types::Hash;

/// Errors produced by world-state engine operations.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// No snapshot has been committed for this `(chain, block)` pair.
    ///
    /// Per-path lookups return empty results for unknown keys; a missing
    /// whole snapshot is a hard error the caller must decide about.
    #[error("no world-state snapshot for chain {chain} at block {block}")]
    SnapshotNotFound { chain: Hash, block: Hash },

    /// A snapshot for this `(chain, block)` pair was already committed.
    /// Committing the same block twice is a programmer error.
    #[error("world-state snapshot already exists for chain {chain} at block {block}")]
    SnapshotExists { chain: Hash, block: Hash },

    /// A stored value could not be decoded. Consensus-critical state is
    /// never silently patched over.
    #[error("corrupt value under key {key}: {reason}")]
    Corrupt { key: Hash, reason: String },

    /// Serialization failure while encoding a value for storage.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Failure propagated unchanged from the byte store.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result alias for engine operations.
pub type StateResult<T> = Result<T, StateError>;
