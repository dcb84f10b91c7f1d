//! Byte-addressed storage boundary for the VWS world-state engine.
//!
//! Everything the engine persists — pointer entries, change records,
//! sequence indexes, snapshots, the cursor slot — goes through one
//! digest-keyed byte store. The engine never assumes transactions,
//! batching, or key listing: each `set` is independently durable once it
//! returns, and ordered structures are simulated above this layer with
//! derived keys.
//!
//! # Backends
//!
//! All backends implement the [`ByteStore`] trait:
//!
//! - [`InMemoryByteStore`] — `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. An absent key is `Ok(None)`, never an error.
//! 2. `set` is an unconditional upsert.
//! 3. All I/O errors are propagated, never masked as "not found".
//! 4. The store never interprets values — it is a pure key-value store.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryByteStore;
pub use traits::ByteStore;
