use std::sync::Arc;

use vws_store::ByteStore;
use vws_types::Hash;

use crate::error::{StateError, StateResult};
use crate::keys;

/// Path digest → current pointer digest.
///
/// The single source of truth for "where is this path's latest value".
/// The table keeps no history of its own: versioning comes entirely from
/// callers deriving a fresh pointer digest per block. Commit moves
/// entries forward; rollback moves them back to a change's `before`
/// value.
pub struct PointerTable {
    store: Arc<dyn ByteStore>,
}

impl PointerTable {
    pub fn new(store: Arc<dyn ByteStore>) -> Self {
        Self { store }
    }

    /// Unconditional upsert of the pointer for `path`. Idempotent.
    pub fn update(&self, path: &Hash, pointer: &Hash) -> StateResult<()> {
        self.store
            .set(keys::pointer_key(path), pointer.as_bytes().to_vec())?;
        Ok(())
    }

    /// The current pointer for `path`, or `None` if it was never written.
    pub fn get(&self, path: &Hash) -> StateResult<Option<Hash>> {
        let key = keys::pointer_key(path);
        match self.store.get(&key)? {
            Some(bytes) => Ok(Some(decode_hash(&key, &bytes)?)),
            None => Ok(None),
        }
    }
}

/// Decode a 32-byte stored value into a digest.
///
/// A value of any other width is corruption, not "not found".
pub(crate) fn decode_hash(key: &Hash, bytes: &[u8]) -> StateResult<Hash> {
    let arr: [u8; 32] = bytes.try_into().map_err(|_| StateError::Corrupt {
        key: *key,
        reason: format!("expected 32-byte digest, got {} bytes", bytes.len()),
    })?;
    Ok(Hash::from_digest(arr))
}
