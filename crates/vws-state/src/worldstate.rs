use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use vws_store::ByteStore;
use vws_types::{Change, ChangesDict, Hash};

use crate::error::{StateError, StateResult};
use crate::keys;

/// Immutable world-state snapshot for one `(chain, block)` pair.
///
/// Holds the full set of path→change records committed for that block.
/// Created once at commit and never mutated; retained indefinitely.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldState {
    chain: Hash,
    block: Hash,
    changes: ChangesDict,
}

impl WorldState {
    pub fn new(chain: Hash, block: Hash, changes: ChangesDict) -> Self {
        Self {
            chain,
            block,
            changes,
        }
    }

    pub fn chain(&self) -> Hash {
        self.chain
    }

    pub fn block(&self) -> Hash {
        self.block
    }

    /// The committed changes, in first-changed order.
    pub fn changes(&self) -> &ChangesDict {
        &self.changes
    }

    /// The change committed for `path` in this snapshot, if any.
    pub fn get_change(&self, path: &Hash) -> Option<&Change> {
        self.changes.get(path)
    }
}

/// Persistence for world-state snapshots, keyed by `(chain, block)`.
pub struct WorldStateStore {
    store: Arc<dyn ByteStore>,
}

impl WorldStateStore {
    pub fn new(store: Arc<dyn ByteStore>) -> Self {
        Self { store }
    }

    /// Persist an immutable snapshot for `(chain, block)`.
    ///
    /// Committing the same pair twice is a programmer error and fails
    /// with [`StateError::SnapshotExists`] rather than overwriting
    /// consensus-critical state.
    pub fn insert(&self, chain: &Hash, block: &Hash, changes: ChangesDict) -> StateResult<()> {
        let key = keys::snapshot_key(chain, block);
        if self.store.contains(&key)? {
            return Err(StateError::SnapshotExists {
                chain: *chain,
                block: *block,
            });
        }
        let encoded =
            bincode::serialize(&changes).map_err(|e| StateError::Serialization(e.to_string()))?;
        self.store.set(key, encoded)?;
        debug!(
            chain = %chain.short_hex(),
            block = %block.short_hex(),
            paths = changes.len(),
            "world-state snapshot persisted"
        );
        Ok(())
    }

    /// Fetch the snapshot for `(chain, block)`.
    ///
    /// A genuinely absent snapshot is a hard error, unlike per-path
    /// lookups which return empty results.
    pub fn get(&self, chain: &Hash, block: &Hash) -> StateResult<WorldState> {
        let key = keys::snapshot_key(chain, block);
        let bytes = self.store.get(&key)?.ok_or(StateError::SnapshotNotFound {
            chain: *chain,
            block: *block,
        })?;
        let changes: ChangesDict =
            bincode::deserialize(&bytes).map_err(|e| StateError::Corrupt {
                key,
                reason: e.to_string(),
            })?;
        Ok(WorldState::new(*chain, *block, changes))
    }
}
