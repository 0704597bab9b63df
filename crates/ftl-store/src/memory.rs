use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::traits::KeyValueStore;

/// In-memory, `BTreeMap`-based key-value store.
///
/// Intended for tests, the CLI, and embedding. Entries are held behind a
/// `RwLock` for safe concurrent access and cloned on read/write. Keys are kept
/// ordered so prefix scans come back sorted.
pub struct InMemoryKvStore {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryKvStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::from_entries(BTreeMap::new())
    }

    /// Create a store pre-populated with `entries`.
    pub fn from_entries(entries: BTreeMap<String, Vec<u8>>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all entries from the store.
    pub fn clear(&self) -> StoreResult<()> {
        self.entries
            .write()
            .map_err(|_| StoreError::LockPoisoned)?
            .clear();
        Ok(())
    }

    /// A copy of every entry, in key order.
    pub fn entries(&self) -> StoreResult<BTreeMap<String, Vec<u8>>> {
        Ok(self
            .entries
            .read()
            .map_err(|_| StoreError::LockPoisoned)?
            .clone())
    }
}

impl Default for InMemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for InMemoryKvStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let map = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(map.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        let mut map = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        map.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<(String, Vec<u8>)>> {
        let map = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(map
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    /// Applies the whole batch under a single write lock, so concurrent
    /// readers observe either none or all of it.
    fn put_batch(&self, entries: &[(String, Vec<u8>)]) -> StoreResult<()> {
        let mut map = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        for (k, v) in entries {
            map.insert(k.clone(), v.clone());
        }
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryKvStore")
            .field("entry_count", &self.len())
            .finish()
    }
}
