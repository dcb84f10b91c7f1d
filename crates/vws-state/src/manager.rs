use std::sync::{Arc, RwLock};

use tracing::{debug, info};
use vws_store::ByteStore;
use vws_types::{Change, Hash, PathChange};

use crate::changelog::ChangeLog;
use crate::error::{StateError, StateResult};
use crate::keys;
use crate::pointer::{decode_hash, PointerTable};
use crate::provider::AccountDataProvider;
use crate::worldstate::{WorldState, WorldStateStore};

/// Orchestrator of the versioned world-state engine.
///
/// Records mutations into the change log under the current cursor block,
/// commits a block's changes into an immutable snapshot, rolls back
/// uncommitted pointer effects, and answers current and historical change
/// queries.
///
/// The cursor is the cached "previous committed block" digest. It is the
/// default block context for every operation that takes `Option<Hash>`,
/// and it advances only inside [`commit`](Self::commit). One manager owns
/// one chain's active block: the engine assumes a single logical writer,
/// so the cursor needs a consistent load per operation but no
/// compare-and-swap.
pub struct WorldStateManager {
    store: Arc<dyn ByteStore>,
    pointers: PointerTable,
    changes: ChangeLog,
    snapshots: WorldStateStore,
    cursor: RwLock<Hash>,
}

impl WorldStateManager {
    /// Open a manager over `store`.
    ///
    /// The cursor is loaded from its well-known slot, defaulting to the
    /// zero digest for a fresh store. Any in-flight change log recorded
    /// for that cursor is preserved, so uncommitted work that was in
    /// flight at crash time can still be inspected via
    /// [`current_changes`](Self::current_changes) or undone via
    /// [`rollback`](Self::rollback).
    pub fn open(store: Arc<dyn ByteStore>) -> StateResult<Self> {
        let cursor_key = keys::pre_block_key();
        let cursor = match store.get(&cursor_key)? {
            Some(bytes) => decode_hash(&cursor_key, &bytes)?,
            None => Hash::zero(),
        };
        info!(cursor = %cursor.short_hex(), "world-state manager opened");
        Ok(Self {
            pointers: PointerTable::new(Arc::clone(&store)),
            changes: ChangeLog::new(Arc::clone(&store)),
            snapshots: WorldStateStore::new(Arc::clone(&store)),
            store,
            cursor: RwLock::new(cursor),
        })
    }

    /// The current cursor digest (one consistent load).
    pub fn cursor(&self) -> Hash {
        *self.cursor.read().expect("lock poisoned")
    }

    /// Record a before/after pointer change for `path` in the block
    /// currently being built.
    pub fn record_change(&self, path: &Hash, change: &Change) -> StateResult<()> {
        self.changes.insert_change(&self.cursor(), path, change)
    }

    /// The uncommitted change recorded for `path` in the current block,
    /// if any.
    pub fn current_change(&self, path: &Hash) -> StateResult<Option<Change>> {
        self.changes.get(&self.cursor(), path)
    }

    /// Commit the current block's changes as an immutable snapshot.
    ///
    /// The snapshot is keyed by `(chain, cursor)` — the cursor value at
    /// commit time, not `new_block`. After persisting it, the new cursor
    /// is written durably to its well-known slot and the in-memory cursor
    /// advances, so subsequent [`record_change`](Self::record_change)
    /// calls index from zero under `new_block`. This is the single
    /// state-transition point of the engine.
    ///
    /// Returns the block digest the snapshot was keyed under.
    pub fn commit(&self, chain: &Hash, new_block: &Hash) -> StateResult<Hash> {
        let committed = self.cursor();
        let dict = self.changes.changes_dict(&committed)?;
        let paths = dict.len();
        self.snapshots.insert(chain, &committed, dict)?;
        self.store
            .set(keys::pre_block_key(), new_block.as_bytes().to_vec())?;
        *self.cursor.write().expect("lock poisoned") = *new_block;
        info!(
            chain = %chain.short_hex(),
            block = %committed.short_hex(),
            next = %new_block.short_hex(),
            paths,
            "block committed"
        );
        Ok(committed)
    }

    /// Undo the materialized pointer effects of the current block.
    ///
    /// Resets every changed path's pointer-table entry to its change's
    /// `before` value. The change log itself and all committed snapshots
    /// are left untouched, so the log stays available for inspection or
    /// retry.
    pub fn rollback(&self) -> StateResult<()> {
        let block = self.cursor();
        let dict = self.changes.changes_dict(&block)?;
        for entry in dict.iter() {
            self.pointers.update(&entry.path, &entry.change.before)?;
        }
        debug!(
            block = %block.short_hex(),
            paths = dict.len(),
            "rolled back uncommitted pointer changes"
        );
        Ok(())
    }

    /// Derive the pointer digest for `path` at `block` (cursor when
    /// `None`).
    ///
    /// Pure: `path.combine(block)`. Never touches the store and never
    /// fails; recomputing it for the same inputs always yields the same
    /// digest.
    pub fn pointer(&self, path: &Hash, block: Option<Hash>) -> Hash {
        let block = block.unwrap_or_else(|| self.cursor());
        path.combine(&block)
    }

    /// Update the pointer-table entry for `path`. Unconditional upsert.
    pub fn update_pointer(&self, path: &Hash, pointer: &Hash) -> StateResult<()> {
        self.pointers.update(path, pointer)
    }

    /// The pointer-table entry for `path`, or `None` if never written.
    pub fn get_pointer(&self, path: &Hash) -> StateResult<Option<Hash>> {
        self.pointers.get(path)
    }

    /// The paths changed in `block` (cursor when `None`), in
    /// first-changed order. Empty for unknown blocks.
    pub fn changed_paths(&self, block: Option<Hash>) -> StateResult<Vec<Hash>> {
        let block = block.unwrap_or_else(|| self.cursor());
        self.changes.ordered_paths(&block)
    }

    /// The committed changes for `(chain, block)`, resolved from the
    /// ordered path index and the persisted snapshot.
    ///
    /// A missing snapshot is a hard error; the caller decides whether
    /// that is fatal.
    pub fn get_changes(&self, chain: &Hash, block: &Hash) -> StateResult<Vec<PathChange>> {
        let paths = self.changes.ordered_paths(block)?;
        let world_state = self.snapshots.get(chain, block)?;
        paths
            .into_iter()
            .map(|path| {
                let change =
                    world_state
                        .get_change(&path)
                        .copied()
                        .ok_or(StateError::Corrupt {
                            key: keys::snapshot_key(chain, block),
                            reason: "indexed path missing from snapshot".into(),
                        })?;
                Ok(PathChange { path, change })
            })
            .collect()
    }

    /// The uncommitted changes for the current block, resolved from the
    /// live change log.
    pub fn current_changes(&self) -> StateResult<Vec<PathChange>> {
        let block = self.cursor();
        Ok(self
            .changes
            .changes_dict(&block)?
            .into_iter()
            .collect())
    }

    /// Fetch the committed snapshot for `(chain, block)`.
    pub fn world_state(&self, chain: &Hash, block: &Hash) -> StateResult<WorldState> {
        self.snapshots.get(chain, block)
    }

    /// Write raw bytes at a pointer digest.
    pub fn set_data(&self, pointer: &Hash, data: Vec<u8>) -> StateResult<()> {
        self.store.set(*pointer, data)?;
        Ok(())
    }

    /// Read raw bytes at a pointer digest.
    pub fn get_data(&self, pointer: &Hash) -> StateResult<Option<Vec<u8>>> {
        Ok(self.store.get(pointer)?)
    }

    /// An account-scoped data view bound to this manager.
    pub fn account_data_provider(self: Arc<Self>, chain: Hash, account: Hash) -> AccountDataProvider {
        AccountDataProvider::new(chain, account, self)
    }
}

impl std::fmt::Debug for WorldStateManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldStateManager")
            .field("cursor", &self.cursor())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vws_store::InMemoryByteStore;

    fn h(data: &[u8]) -> Hash {
        Hash::of(data)
    }

    fn open_manager() -> (Arc<InMemoryByteStore>, WorldStateManager) {
        let store = Arc::new(InMemoryByteStore::new());
        let manager = WorldStateManager::open(Arc::clone(&store) as Arc<dyn ByteStore>).unwrap();
        (store, manager)
    }

    // -----------------------------------------------------------------------
    // Cursor lifecycle
    // -----------------------------------------------------------------------

    #[test]
    fn fresh_store_starts_at_zero_cursor() {
        let (_, manager) = open_manager();
        assert!(manager.cursor().is_zero());
    }

    #[test]
    fn commit_advances_cursor() {
        let (_, manager) = open_manager();
        let committed = manager.commit(&h(b"chain"), &h(b"block-1")).unwrap();
        assert!(committed.is_zero());
        assert_eq!(manager.cursor(), h(b"block-1"));
    }

    #[test]
    fn cursor_survives_reopen() {
        let store = Arc::new(InMemoryByteStore::new());
        {
            let manager =
                WorldStateManager::open(Arc::clone(&store) as Arc<dyn ByteStore>).unwrap();
            manager.commit(&h(b"chain"), &h(b"block-1")).unwrap();
        }
        let reopened = WorldStateManager::open(store as Arc<dyn ByteStore>).unwrap();
        assert_eq!(reopened.cursor(), h(b"block-1"));
    }

    #[test]
    fn uncommitted_log_survives_reopen() {
        let store = Arc::new(InMemoryByteStore::new());
        let change = Change::new(h(b"before"), h(b"after"));
        {
            let manager =
                WorldStateManager::open(Arc::clone(&store) as Arc<dyn ByteStore>).unwrap();
            manager.record_change(&h(b"path"), &change).unwrap();
        }
        // The in-flight index is preserved across restart, so the work can
        // still be inspected or rolled back.
        let reopened = WorldStateManager::open(store as Arc<dyn ByteStore>).unwrap();
        let current = reopened.current_changes().unwrap();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].path, h(b"path"));
        assert_eq!(current[0].change, change);
    }

    // -----------------------------------------------------------------------
    // Pointer derivation (P1, Scenario C)
    // -----------------------------------------------------------------------

    #[test]
    fn pointer_is_pure_and_repeatable() {
        let (_, manager) = open_manager();
        let path = h(b"path");
        let block = h(b"block");
        let p1 = manager.pointer(&path, Some(block));
        // Interleave unrelated state changes.
        manager
            .record_change(&h(b"other"), &Change::new(h(b"x"), h(b"y")))
            .unwrap();
        let p2 = manager.pointer(&path, Some(block));
        assert_eq!(p1, p2);
        assert_eq!(p1, path.combine(&block));
    }

    #[test]
    fn pointer_at_zero_digest_before_any_commit() {
        let (store, manager) = open_manager();
        let path = h(b"path-a");
        let before_keys = store.len();
        let pointer = manager.pointer(&path, Some(Hash::zero()));
        assert_eq!(pointer, path.combine(&Hash::zero()));
        // Pure computation: no store access happened.
        assert_eq!(store.len(), before_keys);
    }

    #[test]
    fn pointer_defaults_to_cursor() {
        let (_, manager) = open_manager();
        let path = h(b"path");
        assert_eq!(
            manager.pointer(&path, None),
            path.combine(&manager.cursor())
        );
    }

    // -----------------------------------------------------------------------
    // Ordering (P2)
    // -----------------------------------------------------------------------

    #[test]
    fn changed_paths_preserve_insertion_order() {
        let (_, manager) = open_manager();
        let paths: Vec<Hash> = (0u8..5).map(|i| h(&[i])).collect();
        for path in &paths {
            manager
                .record_change(path, &Change::new(h(b"b"), h(b"a")))
                .unwrap();
        }
        assert_eq!(manager.changed_paths(None).unwrap(), paths);
    }

    // -----------------------------------------------------------------------
    // Rollback (P3)
    // -----------------------------------------------------------------------

    #[test]
    fn rollback_restores_before_pointers() {
        let (_, manager) = open_manager();
        let path = h(b"path");
        let (x, y) = (h(b"X"), h(b"Y"));
        manager.record_change(&path, &Change::new(x, y)).unwrap();
        manager.update_pointer(&path, &y).unwrap();
        assert_eq!(manager.get_pointer(&path).unwrap(), Some(y));

        manager.rollback().unwrap();
        assert_eq!(manager.get_pointer(&path).unwrap(), Some(x));
    }

    #[test]
    fn rollback_ignores_unchanged_paths() {
        let (_, manager) = open_manager();
        let untouched = h(b"untouched");
        manager.update_pointer(&untouched, &h(b"v")).unwrap();
        manager
            .record_change(&h(b"changed"), &Change::new(h(b"x"), h(b"y")))
            .unwrap();

        manager.rollback().unwrap();
        assert_eq!(manager.get_pointer(&untouched).unwrap(), Some(h(b"v")));
    }

    #[test]
    fn rollback_with_empty_log_is_a_no_op() {
        let (_, manager) = open_manager();
        manager.rollback().unwrap();
        assert!(manager.current_changes().unwrap().is_empty());
    }

    #[test]
    fn rollback_leaves_log_available_for_retry() {
        let (_, manager) = open_manager();
        let change = Change::new(h(b"x"), h(b"y"));
        manager.record_change(&h(b"path"), &change).unwrap();
        manager.rollback().unwrap();

        let current = manager.current_changes().unwrap();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].change, change);
    }

    // -----------------------------------------------------------------------
    // Commit and snapshots (P4, P5, Scenario A)
    // -----------------------------------------------------------------------

    #[test]
    fn commit_then_read_back_changes() {
        // Scenario A: record, commit, then query by the pre-commit cursor.
        let (_, manager) = open_manager();
        let chain = h(b"chain-1");
        let path_a = h(b"path-a");
        let change = Change::new(h(b"H0"), h(b"H1"));
        manager.record_change(&path_a, &change).unwrap();

        let pre_commit_cursor = manager.cursor();
        let committed = manager.commit(&chain, &h(b"block-b")).unwrap();
        assert_eq!(committed, pre_commit_cursor);

        let changes = manager.get_changes(&chain, &pre_commit_cursor).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, path_a);
        assert_eq!(changes[0].change, change);
    }

    #[test]
    fn sequence_restarts_at_zero_after_commit() {
        // P5: post-commit, the new cursor's index starts empty.
        let (_, manager) = open_manager();
        let chain = h(b"chain");
        manager
            .record_change(&h(b"p1"), &Change::new(h(b"a"), h(b"b")))
            .unwrap();
        manager.commit(&chain, &h(b"block-1")).unwrap();

        assert!(manager.changed_paths(None).unwrap().is_empty());
        manager
            .record_change(&h(b"p2"), &Change::new(h(b"c"), h(b"d")))
            .unwrap();
        assert_eq!(manager.changed_paths(None).unwrap(), vec![h(b"p2")]);
    }

    #[test]
    fn snapshots_are_immutable_across_later_commits() {
        // P4: a committed snapshot reads the same after further commits.
        let (_, manager) = open_manager();
        let chain = h(b"chain");
        let change = Change::new(h(b"a"), h(b"b"));
        manager.record_change(&h(b"p1"), &change).unwrap();
        let first_block = manager.commit(&chain, &h(b"block-1")).unwrap();

        let before = manager.get_changes(&chain, &first_block).unwrap();

        manager
            .record_change(&h(b"p2"), &Change::new(h(b"c"), h(b"d")))
            .unwrap();
        manager.commit(&chain, &h(b"block-2")).unwrap();
        manager.commit(&chain, &h(b"block-3")).unwrap();

        let after = manager.get_changes(&chain, &first_block).unwrap();
        assert_eq!(before, after);
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].change, change);
    }

    #[test]
    fn double_commit_of_same_block_fails() {
        let (_, manager) = open_manager();
        let chain = h(b"chain");
        // Committing to the cursor's own digest leaves the cursor in
        // place, so the next commit targets the same snapshot key.
        manager.commit(&chain, &Hash::zero()).unwrap();
        assert!(matches!(
            manager.commit(&chain, &h(b"block-1")),
            Err(StateError::SnapshotExists { .. })
        ));
    }

    #[test]
    fn last_write_wins_within_a_block() {
        // Scenario B: the second record overwrites; one index entry.
        let (_, manager) = open_manager();
        let chain = h(b"chain");
        let path = h(b"path");
        manager
            .record_change(&path, &Change::new(h(b"H0"), h(b"H1")))
            .unwrap();
        manager
            .record_change(&path, &Change::new(h(b"H0"), h(b"H2")))
            .unwrap();

        let block = manager.commit(&chain, &h(b"next")).unwrap();
        let changes = manager.get_changes(&chain, &block).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].change.after, h(b"H2"));
    }

    #[test]
    fn get_changes_for_unknown_block_is_snapshot_not_found() {
        let (_, manager) = open_manager();
        assert!(matches!(
            manager.get_changes(&h(b"chain"), &h(b"unknown")),
            Err(StateError::SnapshotNotFound { .. })
        ));
    }

    #[test]
    fn current_changes_reads_the_live_log() {
        let (_, manager) = open_manager();
        let c1 = Change::new(h(b"a"), h(b"b"));
        let c2 = Change::new(h(b"c"), h(b"d"));
        manager.record_change(&h(b"p1"), &c1).unwrap();
        manager.record_change(&h(b"p2"), &c2).unwrap();

        let current = manager.current_changes().unwrap();
        assert_eq!(current.len(), 2);
        assert_eq!(current[0].path, h(b"p1"));
        assert_eq!(current[1].path, h(b"p2"));
        assert_eq!(current[0].change, c1);
        assert_eq!(current[1].change, c2);
    }

    #[test]
    fn chains_commit_independent_snapshots() {
        let (_, manager) = open_manager();
        manager
            .record_change(&h(b"p"), &Change::new(h(b"a"), h(b"b")))
            .unwrap();
        let block = manager.commit(&h(b"chain-1"), &h(b"next")).unwrap();

        assert!(manager.get_changes(&h(b"chain-1"), &block).is_ok());
        assert!(matches!(
            manager.get_changes(&h(b"chain-2"), &block),
            Err(StateError::SnapshotNotFound { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // Data passthrough
    // -----------------------------------------------------------------------

    #[test]
    fn set_and_get_data_at_pointer() {
        let (_, manager) = open_manager();
        let pointer = manager.pointer(&h(b"path"), None);
        manager.set_data(&pointer, b"payload".to_vec()).unwrap();
        assert_eq!(
            manager.get_data(&pointer).unwrap(),
            Some(b"payload".to_vec())
        );
    }

    #[test]
    fn get_data_at_unwritten_pointer_is_none() {
        let (_, manager) = open_manager();
        assert_eq!(manager.get_data(&h(b"nowhere")).unwrap(), None);
    }

    // -----------------------------------------------------------------------
    // Full block lifecycle
    // -----------------------------------------------------------------------

    #[test]
    fn mvcc_versions_remain_addressable_across_blocks() {
        let (_, manager) = open_manager();
        let chain = h(b"chain");
        let path = h(b"account-balance");

        // Block 0: write v1 at the pointer derived from the zero cursor.
        let ptr_v1 = manager.pointer(&path, None);
        manager.set_data(&ptr_v1, b"v1".to_vec()).unwrap();
        manager
            .record_change(&path, &Change::new(Hash::zero(), ptr_v1))
            .unwrap();
        manager.update_pointer(&path, &ptr_v1).unwrap();
        manager.commit(&chain, &h(b"block-1")).unwrap();

        // Block 1: same logical path, different physical pointer.
        let ptr_v2 = manager.pointer(&path, None);
        assert_ne!(ptr_v1, ptr_v2);
        manager.set_data(&ptr_v2, b"v2".to_vec()).unwrap();
        manager
            .record_change(&path, &Change::new(ptr_v1, ptr_v2))
            .unwrap();
        manager.update_pointer(&path, &ptr_v2).unwrap();
        manager.commit(&chain, &h(b"block-2")).unwrap();

        // Latest resolves through the pointer table; the old version is
        // still addressable at its own pointer.
        assert_eq!(manager.get_pointer(&path).unwrap(), Some(ptr_v2));
        assert_eq!(manager.get_data(&ptr_v2).unwrap(), Some(b"v2".to_vec()));
        assert_eq!(manager.get_data(&ptr_v1).unwrap(), Some(b"v1".to_vec()));
    }
}
