use std::collections::HashMap;
use std::sync::RwLock;

use vws_types::Hash;

use crate::error::StoreResult;
use crate::traits::ByteStore;

/// In-memory, HashMap-based byte store.
///
/// Intended for tests and embedding. All values are held in memory behind
/// a `RwLock` for safe concurrent access and cloned on read.
pub struct InMemoryByteStore {
    values: RwLock<HashMap<Hash, Vec<u8>>>,
}

impl InMemoryByteStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.values.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.values.read().expect("lock poisoned").is_empty()
    }

    /// Total bytes across all stored values.
    pub fn total_bytes(&self) -> u64 {
        self.values
            .read()
            .expect("lock poisoned")
            .values()
            .map(|v| v.len() as u64)
            .sum()
    }

    /// Remove all values from the store.
    pub fn clear(&self) {
        self.values.write().expect("lock poisoned").clear();
    }
}

impl Default for InMemoryByteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteStore for InMemoryByteStore {
    fn get(&self, key: &Hash) -> StoreResult<Option<Vec<u8>>> {
        let map = self.values.read().expect("lock poisoned");
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: Hash, value: Vec<u8>) -> StoreResult<()> {
        let mut map = self.values.write().expect("lock poisoned");
        map.insert(key, value);
        Ok(())
    }

    fn contains(&self, key: &Hash) -> StoreResult<bool> {
        let map = self.values.read().expect("lock poisoned");
        Ok(map.contains_key(key))
    }
}

impl std::fmt::Debug for InMemoryByteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryByteStore")
            .field("key_count", &self.len())
            .finish()
    }
}
