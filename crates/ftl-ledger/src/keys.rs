//! Storage key derivation.
//!
//! Keys are `balance::<account>` and `allowance::<owner>::<spender>`, the
//! layout existing ledger data already uses. `%` and `:` inside an identity
//! are percent-escaped so no pair of distinct identities (or owner/spender
//! splits) can produce the same key.

use ftl_types::AccountId;

pub const BALANCE_PREFIX: &str = "balance::";
pub const ALLOWANCE_PREFIX: &str = "allowance::";

/// Records the owner that received the genesis mint.
pub const GENESIS_KEY: &str = "meta::genesis";

const SEPARATOR: &str = "::";

fn escape(id: &AccountId) -> String {
    let raw = id.as_str();
    if !raw.contains(['%', ':']) {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len() + 8);
    for c in raw.chars() {
        match c {
            '%' => out.push_str("%25"),
            ':' => out.push_str("%3A"),
            other => out.push(other),
        }
    }
    out
}

fn unescape(component: &str) -> String {
    component.replace("%3A", ":").replace("%25", "%")
}

/// Storage key of an account's balance record.
pub fn balance_key(account: &AccountId) -> String {
    format!("{BALANCE_PREFIX}{}", escape(account))
}

/// Storage key of the amount `spender` may move out of `owner`'s balance.
pub fn allowance_key(owner: &AccountId, spender: &AccountId) -> String {
    format!(
        "{ALLOWANCE_PREFIX}{}{SEPARATOR}{}",
        escape(owner),
        escape(spender)
    )
}

/// Recover the account from a balance key produced by [`balance_key`].
pub fn account_from_balance_key(key: &str) -> Option<AccountId> {
    key.strip_prefix(BALANCE_PREFIX)
        .filter(|rest| !rest.contains(':'))
        .map(|rest| AccountId::new(unescape(rest)))
}
