use crate::error::StoreResult;

/// Host-provided key-value store.
///
/// All implementations must satisfy these invariants:
/// - `get` after `put` on the same handle observes the written value.
/// - Unknown keys read as `Ok(None)`, never as an error.
/// - The store never interprets values.
/// - All I/O errors are propagated, never silently ignored.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()>;

    /// All entries whose key starts with `prefix`, in key order.
    fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<(String, Vec<u8>)>>;

    /// Write multiple entries.
    ///
    /// Default implementation calls `put()` for each entry. Backends may
    /// override to apply the whole batch atomically.
    fn put_batch(&self, entries: &[(String, Vec<u8>)]) -> StoreResult<()> {
        entries.iter().try_for_each(|(k, v)| self.put(k, v))
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        (**self).put(key, value)
    }

    fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<(String, Vec<u8>)>> {
        (**self).scan_prefix(prefix)
    }

    fn put_batch(&self, entries: &[(String, Vec<u8>)]) -> StoreResult<()> {
        (**self).put_batch(entries)
    }
}
