//! Versioned world-state engine for VWS.
//!
//! This crate is the heart of VWS. It records, per block, every mutation
//! made to logical state paths, commits them as immutable snapshots keyed
//! by `(chain, block)`, and rolls back uncommitted pointer effects. It
//! provides:
//!
//! - The well-known on-disk key layout (`keys` module)
//! - [`PointerTable`] — path digest → current pointer digest
//! - [`ChangeLog`] — per-block change records plus the deterministic
//!   ordered index of changed paths
//! - [`WorldState`] / [`WorldStateStore`] — immutable per-(chain, block)
//!   snapshots
//! - [`WorldStateManager`] — the orchestrator: record, commit, rollback,
//!   and historical/current change queries
//! - Thin account-data and token-symbol providers
//!
//! All state flows one way during normal operation: mutation → change log
//! (+ ordered index) → snapshot store at commit, with the pointer table
//! updated in lockstep. Rollback reverses only the pointer table, using
//! the change log's `before` values; committed snapshots are never
//! touched.

pub mod changelog;
pub mod error;
pub mod keys;
pub mod manager;
pub mod pointer;
pub mod provider;
pub mod worldstate;

pub use changelog::ChangeLog;
pub use error::{StateError, StateResult};
pub use manager::WorldStateManager;
pub use pointer::PointerTable;
pub use provider::{
    AccountDataProvider, DefaultPrimaryTokenSymbolProvider, PrimaryTokenSymbolProvider,
};
pub use worldstate::{WorldState, WorldStateStore};
