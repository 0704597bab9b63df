use ftl_store::KeyValueStore;
use ftl_types::{AccountId, Quantity};

use crate::codec;
use crate::error::{LedgerError, LedgerResult};
use crate::keys;

/// Balance and allowance accessor over the host key-value store.
///
/// Writes are staged inside the accessor and only reach the store on
/// [`AccountStore::flush`]. Reads observe staged writes first, so a
/// read-modify-write sequence touching the same record twice (a self
/// transfer, say) sees its own earlier update. An operation that fails
/// before flushing has issued no writes at all.
pub struct AccountStore<'a> {
    store: &'a dyn KeyValueStore,
    staged: Vec<(String, Vec<u8>)>,
}

impl<'a> AccountStore<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self {
            store,
            staged: Vec::new(),
        }
    }

    fn read(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        if let Some((_, v)) = self.staged.iter().rev().find(|(k, _)| k == key) {
            return Ok(Some(v.clone()));
        }
        self.store.get(key).map_err(|e| LedgerError::read(key, e))
    }

    fn read_quantity(&self, key: &str) -> LedgerResult<Quantity> {
        match self.read(key)? {
            Some(bytes) => codec::decode(key, &bytes),
            None => Ok(0),
        }
    }

    fn stage(&mut self, key: String, value: Vec<u8>) {
        match self.staged.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.staged.push((key, value)),
        }
    }

    /// Balance of `account`; an absent record reads as 0.
    pub fn get_balance(&self, account: &AccountId) -> LedgerResult<Quantity> {
        self.read_quantity(&keys::balance_key(account))
    }

    pub fn set_balance(&mut self, account: &AccountId, value: Quantity) {
        self.stage(keys::balance_key(account), codec::encode(value));
    }

    /// Remaining amount `spender` may move out of `owner`'s balance.
    pub fn get_allowance(&self, owner: &AccountId, spender: &AccountId) -> LedgerResult<Quantity> {
        self.read_quantity(&keys::allowance_key(owner, spender))
    }

    pub fn set_allowance(&mut self, owner: &AccountId, spender: &AccountId, value: Quantity) {
        self.stage(keys::allowance_key(owner, spender), codec::encode(value));
    }

    /// Owner recorded by a previous genesis, if any.
    pub fn genesis_owner(&self) -> LedgerResult<Option<AccountId>> {
        let owner = self.read(keys::GENESIS_KEY)?;
        owner
            .map(|bytes| {
                String::from_utf8(bytes)
                    .map(AccountId::new)
                    .map_err(|e| LedgerError::StorageCorruption {
                        key: keys::GENESIS_KEY.to_string(),
                        value: String::from_utf8_lossy(e.as_bytes()).into_owned(),
                    })
            })
            .transpose()
    }

    pub fn record_genesis(&mut self, owner: &AccountId) {
        self.stage(keys::GENESIS_KEY.to_string(), owner.as_str().as_bytes().to_vec());
    }

    /// Every account with a balance record, in key order, including staged
    /// writes. Zero-valued records are reported like any other.
    pub fn balances(&self) -> LedgerResult<Vec<(AccountId, Quantity)>> {
        let mut entries = self
            .store
            .scan_prefix(keys::BALANCE_PREFIX)
            .map_err(|e| LedgerError::read(keys::BALANCE_PREFIX, e))?;
        for (k, v) in &self.staged {
            if !k.starts_with(keys::BALANCE_PREFIX) {
                continue;
            }
            match entries.iter_mut().find(|(ek, _)| ek == k) {
                Some(slot) => slot.1 = v.clone(),
                None => entries.push((k.clone(), v.clone())),
            }
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut out = Vec::with_capacity(entries.len());
        for (key, bytes) in entries {
            if let Some(account) = keys::account_from_balance_key(&key) {
                out.push((account, codec::decode(&key, &bytes)?));
            }
        }
        Ok(out)
    }

    /// Hand every staged write to the store as one batch, in the order first
    /// staged.
    ///
    /// Returns the number of keys written. The batch is all-or-nothing when
    /// the store's `put_batch` is (the in-memory store and [`Transaction`]
    /// both are); otherwise the host transaction discards a partial batch.
    ///
    /// [`Transaction`]: ftl_store::Transaction
    pub fn flush(self) -> LedgerResult<usize> {
        if self.staged.is_empty() {
            return Ok(0);
        }
        self.store.put_batch(&self.staged).map_err(|e| {
            let keys: Vec<&str> = self.staged.iter().map(|(k, _)| k.as_str()).collect();
            LedgerError::write(&keys.join(","), e)
        })?;
        Ok(self.staged.len())
    }
}
