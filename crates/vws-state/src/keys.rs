//! Well-known storage key derivations.
//!
//! Every key the engine writes to the byte store derives from a fixed
//! string literal hashed with BLAKE3, combined with the relevant block,
//! chain, and path digests. This layout is the on-disk contract: a
//! compatible reimplementation must reproduce these derivations
//! bit-for-bit to read existing persisted state.
//!
//! The ordered per-block path index is simulated with a count slot plus
//! one slot per sequence number, because the byte store has no "list keys
//! by prefix" primitive. Index slots use [`Hash::combine_reverse`] so
//! they occupy a key region disjoint from the count slot derived from the
//! same block digest.

use vws_types::Hash;

/// Key of the cursor slot holding the previous committed block digest.
pub fn pre_block_key() -> Hash {
    Hash::of(b"PreviousBlockHash")
}

/// Key of the changed-paths count for `block` (u64 little-endian value).
pub fn paths_count_key(block: &Hash) -> Hash {
    Hash::of(b"paths").combine(block)
}

/// Key of the path digest recorded at sequence `index` for `block`.
pub fn path_index_key(block: &Hash, index: u64) -> Hash {
    block.combine_reverse(&index.to_le_bytes())
}

/// Key of the change record for `path` within `block`.
pub fn change_key(block: &Hash, path: &Hash) -> Hash {
    Hash::of(b"changes").combine(block).combine(path)
}

/// Key of the current pointer entry for `path`.
pub fn pointer_key(path: &Hash) -> Hash {
    Hash::of(b"pointer").combine(path)
}

/// Key of the world-state snapshot for `(chain, block)`.
pub fn snapshot_key(chain: &Hash, block: &Hash) -> Hash {
    Hash::of(b"world-state").combine(chain).combine(block)
}
