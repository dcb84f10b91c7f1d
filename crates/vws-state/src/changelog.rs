use std::sync::Arc;

use tracing::debug;
use vws_store::ByteStore;
use vws_types::{Change, ChangesDict, Hash};

use crate::error::{StateError, StateResult};
use crate::keys;
use crate::pointer::decode_hash;

/// Per-block change records plus the deterministic ordered index of
/// changed paths.
///
/// Everything is namespaced by block digest and persisted in the byte
/// store, so an uncommitted block's log survives a restart and stays
/// available for inspection or rollback. The ordered index is a count
/// slot plus one slot per sequence number (see the `keys` module); this
/// component is the only place that key arithmetic happens.
///
/// The engine assumes a single logical writer per chain per block, so the
/// record write and the index append need no transaction: a subsequent
/// read in the same session observes both.
pub struct ChangeLog {
    store: Arc<dyn ByteStore>,
}

impl ChangeLog {
    pub fn new(store: Arc<dyn ByteStore>) -> Self {
        Self { store }
    }

    /// Record `change` for `path` within `block`.
    ///
    /// The first change for a path appends the path to the ordered index
    /// at the next sequence number and bumps the block's path count.
    /// Recording the same path again overwrites the change record only —
    /// the index keeps first-changed order and never holds duplicates, so
    /// the last write's `after` is what a snapshot commits.
    pub fn insert_change(&self, block: &Hash, path: &Hash, change: &Change) -> StateResult<()> {
        let record_key = keys::change_key(block, path);
        let already_recorded = self.store.contains(&record_key)?;

        let encoded =
            bincode::serialize(change).map_err(|e| StateError::Serialization(e.to_string()))?;
        self.store.set(record_key, encoded)?;

        if !already_recorded {
            let count = self.count(block)?;
            self.store.set(
                keys::path_index_key(block, count),
                path.as_bytes().to_vec(),
            )?;
            self.store.set(
                keys::paths_count_key(block),
                (count + 1).to_le_bytes().to_vec(),
            )?;
            debug!(
                block = %block.short_hex(),
                path = %path.short_hex(),
                seq = count,
                "change recorded"
            );
        }
        Ok(())
    }

    /// The change recorded for `path` within `block`, if any.
    pub fn get(&self, block: &Hash, path: &Hash) -> StateResult<Option<Change>> {
        let key = keys::change_key(block, path);
        match self.store.get(&key)? {
            Some(bytes) => {
                let change = bincode::deserialize(&bytes).map_err(|e| StateError::Corrupt {
                    key,
                    reason: e.to_string(),
                })?;
                Ok(Some(change))
            }
            None => Ok(None),
        }
    }

    /// Number of distinct paths changed in `block`. Zero for blocks this
    /// log has never seen.
    pub fn count(&self, block: &Hash) -> StateResult<u64> {
        let key = keys::paths_count_key(block);
        match self.store.get(&key)? {
            Some(bytes) => {
                let arr: [u8; 8] = bytes.as_slice().try_into().map_err(|_| StateError::Corrupt {
                    key,
                    reason: format!("expected 8-byte count, got {} bytes", bytes.len()),
                })?;
                Ok(u64::from_le_bytes(arr))
            }
            None => Ok(0),
        }
    }

    /// The paths changed in `block`, in the order they were first
    /// changed. Empty for unknown blocks — never an error.
    ///
    /// Reconstructed by reading the count slot and replaying index
    /// entries `0..count`.
    pub fn ordered_paths(&self, block: &Hash) -> StateResult<Vec<Hash>> {
        let count = self.count(block)?;
        let mut paths = Vec::with_capacity(count as usize);
        for index in 0..count {
            let key = keys::path_index_key(block, index);
            let bytes = self.store.get(&key)?.ok_or(StateError::Corrupt {
                key,
                reason: format!("index entry {index} missing below count {count}"),
            })?;
            paths.push(decode_hash(&key, &bytes)?);
        }
        Ok(paths)
    }

    /// Materialize the ordered path→change dict for `block`.
    ///
    /// This is the commit-time input; rollback walks the same dict to
    /// restore `before` pointers.
    pub fn changes_dict(&self, block: &Hash) -> StateResult<ChangesDict> {
        let mut dict = ChangesDict::new();
        for path in self.ordered_paths(block)? {
            let key = keys::change_key(block, &path);
            let change = self.get(block, &path)?.ok_or(StateError::Corrupt {
                key,
                reason: "indexed path has no change record".into(),
            })?;
            dict.insert(path, change);
        }
        Ok(dict)
    }
}
