use serde::{Deserialize, Serialize};

use crate::hash::Hash;

/// Before/after pointer pair for one path within one block.
///
/// `before` is the pointer the path resolved to when the block's
/// processing first touched it; `after` is the pointer it resolves to as
/// a result of the block. Rollback restores `before`; commit folds the
/// pair into an immutable snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub before: Hash,
    pub after: Hash,
}

impl Change {
    pub fn new(before: Hash, after: Hash) -> Self {
        Self { before, after }
    }
}

/// One entry of a [`ChangesDict`]: a path digest and its change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathChange {
    pub path: Hash,
    pub change: Change,
}

/// Insertion-ordered path→change map.
///
/// Order is the sequence in which paths were *first* changed within the
/// block; re-inserting a path overwrites its change in place (last write
/// wins) without disturbing the order. Materialized from the change log
/// at commit time and embedded verbatim into a world-state snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangesDict {
    entries: Vec<PathChange>,
}

impl ChangesDict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the change for `path`.
    ///
    /// First insertion appends; later insertions for the same path replace
    /// the change but keep the original position.
    pub fn insert(&mut self, path: Hash, change: Change) {
        match self.entries.iter_mut().find(|e| e.path == path) {
            Some(entry) => entry.change = change,
            None => self.entries.push(PathChange { path, change }),
        }
    }

    /// The change recorded for `path`, if any.
    pub fn get(&self, path: &Hash) -> Option<&Change> {
        self.entries.iter().find(|e| e.path == *path).map(|e| &e.change)
    }

    /// Entries in first-changed order.
    pub fn iter(&self) -> impl Iterator<Item = &PathChange> {
        self.entries.iter()
    }

    /// Path digests in first-changed order.
    pub fn paths(&self) -> Vec<Hash> {
        self.entries.iter().map(|e| e.path).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for ChangesDict {
    type Item = PathChange;
    type IntoIter = std::vec::IntoIter<PathChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<PathChange> for ChangesDict {
    fn from_iter<I: IntoIterator<Item = PathChange>>(iter: I) -> Self {
        let mut dict = Self::new();
        for entry in iter {
            dict.insert(entry.path, entry.change);
        }
        dict
    }
}
