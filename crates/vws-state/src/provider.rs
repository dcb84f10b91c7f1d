use std::sync::{Arc, RwLock};

use vws_types::{Change, Hash, StatePath};

use crate::error::StateResult;
use crate::manager::WorldStateManager;

/// Account-scoped data view bound to a [`WorldStateManager`].
///
/// Pure routing: it derives state paths for `(chain, account, key)`
/// triples and forwards reads and writes through the manager. Writes
/// record the change, store the bytes at the block-bound pointer, and
/// advance the pointer table in lockstep, so the manager's commit and
/// rollback semantics apply unchanged.
pub struct AccountDataProvider {
    chain: Hash,
    account: Hash,
    manager: Arc<WorldStateManager>,
}

impl AccountDataProvider {
    pub fn new(chain: Hash, account: Hash, manager: Arc<WorldStateManager>) -> Self {
        Self {
            chain,
            account,
            manager,
        }
    }

    pub fn chain(&self) -> Hash {
        self.chain
    }

    pub fn account(&self) -> Hash {
        self.account
    }

    /// The state path for `key` under this account.
    pub fn path(&self, key: &Hash) -> StatePath {
        StatePath::new(self.chain, self.account, *key)
    }

    /// Read the latest value stored under `key`, resolving the pointer
    /// table then the byte store. `None` if the key was never written.
    pub fn get(&self, key: &Hash) -> StateResult<Option<Vec<u8>>> {
        let digest = self.path(key).digest();
        match self.manager.get_pointer(&digest)? {
            Some(pointer) => self.manager.get_data(&pointer),
            None => Ok(None),
        }
    }

    /// Write `data` under `key` in the block currently being built.
    ///
    /// The change's `before` is the pointer in effect when this block
    /// first touched the key — a repeat write within one block keeps the
    /// original `before` so rollback still lands on pre-block state.
    pub fn set(&self, key: &Hash, data: Vec<u8>) -> StateResult<()> {
        let path = self.path(key);
        let digest = path.digest();
        let after = path.pointer_at(&self.manager.cursor());
        let before = match self.manager.current_change(&digest)? {
            Some(change) => change.before,
            None => self.manager.get_pointer(&digest)?.unwrap_or_default(),
        };
        self.manager
            .record_change(&digest, &Change::new(before, after))?;
        self.manager.set_data(&after, data)?;
        self.manager.update_pointer(&digest, &after)
    }
}

/// Provider of the primary token symbol used when validating a sender's
/// balance. A simple policy provider, external to the engine core.
pub trait PrimaryTokenSymbolProvider: Send + Sync {
    fn symbol(&self) -> String;
    fn set_symbol(&self, symbol: String);
}

/// Default provider returning a fixed symbol until one is set.
pub struct DefaultPrimaryTokenSymbolProvider {
    symbol: RwLock<String>,
}

impl DefaultPrimaryTokenSymbolProvider {
    pub const DEFAULT_SYMBOL: &'static str = "VWS";

    pub fn new() -> Self {
        Self {
            symbol: RwLock::new(Self::DEFAULT_SYMBOL.to_string()),
        }
    }
}

impl Default for DefaultPrimaryTokenSymbolProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PrimaryTokenSymbolProvider for DefaultPrimaryTokenSymbolProvider {
    fn symbol(&self) -> String {
        self.symbol.read().expect("lock poisoned").clone()
    }

    fn set_symbol(&self, symbol: String) {
        *self.symbol.write().expect("lock poisoned") = symbol;
    }
}
