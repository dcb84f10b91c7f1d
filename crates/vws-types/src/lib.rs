//! Foundation types for the VWS versioned world-state engine.
//!
//! This crate provides the digest and change-record types used throughout
//! VWS. Every other VWS crate depends on `vws-types`.
//!
//! # Key Types
//!
//! - [`Hash`] — fixed-size BLAKE3 digest, the universal key type, with
//!   deterministic combination operators
//! - [`StatePath`] — builder for the digest of one logical unit of mutable
//!   state, bindable to a block to produce a pointer digest
//! - [`Change`] — before/after pointer pair for one path within one block
//! - [`ChangesDict`] — insertion-ordered path→change map committed as part
//!   of a world-state snapshot

pub mod change;
pub mod error;
pub mod hash;
pub mod path;

pub use change::{Change, ChangesDict, PathChange};
pub use error::TypeError;
pub use hash::Hash;
pub use path::StatePath;
