use std::collections::BTreeMap;
use std::sync::Mutex;

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::KeyValueStore;

/// A per-invocation write overlay on top of a backing store.
///
/// Reads see the transaction's own writes first, then the backing store.
/// Writes stay buffered until [`Transaction::commit`], which hands the whole
/// write set to the backend's `put_batch`. Dropping or rolling back a
/// transaction discards every buffered write.
pub struct Transaction<S: KeyValueStore> {
    base: S,
    writes: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl<S: KeyValueStore> Transaction<S> {
    /// Open a transaction over `base`.
    pub fn begin(base: S) -> Self {
        Self {
            base,
            writes: Mutex::new(BTreeMap::new()),
        }
    }

    /// Number of distinct keys written so far.
    pub fn pending_writes(&self) -> usize {
        self.writes.lock().map(|w| w.len()).unwrap_or(0)
    }

    /// Apply every buffered write to the backing store.
    ///
    /// Returns the number of keys written.
    pub fn commit(self) -> StoreResult<usize> {
        let writes = self
            .writes
            .into_inner()
            .map_err(|_| StoreError::LockPoisoned)?;
        let batch: Vec<(String, Vec<u8>)> = writes.into_iter().collect();
        self.base.put_batch(&batch)?;
        debug!(keys = batch.len(), "transaction committed");
        Ok(batch.len())
    }

    /// Discard every buffered write. Returns the number of keys discarded.
    pub fn rollback(self) -> usize {
        let discarded = self.pending_writes();
        debug!(keys = discarded, "transaction rolled back");
        discarded
    }
}

impl<S: KeyValueStore> KeyValueStore for Transaction<S> {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        {
            let writes = self.writes.lock().map_err(|_| StoreError::LockPoisoned)?;
            if let Some(v) = writes.get(key) {
                return Ok(Some(v.clone()));
            }
        }
        self.base.get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        let mut writes = self.writes.lock().map_err(|_| StoreError::LockPoisoned)?;
        writes.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<(String, Vec<u8>)>> {
        let mut merged: BTreeMap<String, Vec<u8>> =
            self.base.scan_prefix(prefix)?.into_iter().collect();
        let writes = self.writes.lock().map_err(|_| StoreError::LockPoisoned)?;
        for (k, v) in writes.iter().filter(|(k, _)| k.starts_with(prefix)) {
            merged.insert(k.clone(), v.clone());
        }
        Ok(merged.into_iter().collect())
    }
}

impl<S: KeyValueStore> std::fmt::Debug for Transaction<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("pending_writes", &self.pending_writes())
            .finish()
    }
}
