use vws_types::Hash;

use crate::error::StoreResult;

/// Digest-keyed byte store.
///
/// All implementations must satisfy these invariants:
/// - An absent key returns `Ok(None)`; errors are reserved for real I/O
///   or backend failures and must never be collapsed into `None`.
/// - `set` is an unconditional upsert and is independently durable once
///   it returns (no batching or transaction contract is assumed).
/// - The store never interprets values.
/// - Calls are blocking; callers wanting parallelism run independent
///   engines on separate threads rather than suspending per call.
pub trait ByteStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key has never been written.
    fn get(&self, key: &Hash) -> StoreResult<Option<Vec<u8>>>;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&self, key: Hash, value: Vec<u8>) -> StoreResult<()>;

    /// Check whether a key has a stored value.
    ///
    /// Default implementation reads the value; backends may override to
    /// avoid moving bytes.
    fn contains(&self, key: &Hash) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}
