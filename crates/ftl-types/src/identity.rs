use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a ledger participant.
///
/// An `AccountId` is an opaque string handed to the engine by the host after
/// it has verified the caller's credential. The engine never interprets the
/// contents; it only compares, orders, and embeds them in storage keys.
///
/// The empty identity is reserved for the mint side of the genesis
/// `Transfer` event (see [`AccountId::mint`]).
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Wrap a host-supplied identity string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The empty identity used as `from` when supply is minted at genesis.
    pub fn mint() -> Self {
        Self(String::new())
    }

    /// Returns `true` for the genesis mint identity.
    pub fn is_mint(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({:?})", self.0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_string_is_same_identity() {
        assert_eq!(AccountId::new("alice"), AccountId::from("alice"));
        assert_ne!(AccountId::new("alice"), AccountId::new("Alice"));
    }

    #[test]
    fn mint_identity_is_empty() {
        let mint = AccountId::mint();
        assert!(mint.is_mint());
        assert_eq!(mint.as_str(), "");
        assert!(!AccountId::new("alice").is_mint());
    }

    #[test]
    fn display_is_raw_string() {
        assert_eq!(AccountId::new("CN=bob").to_string(), "CN=bob");
    }

    #[test]
    fn debug_is_quoted() {
        assert_eq!(format!("{:?}", AccountId::new("bob")), "AccountId(\"bob\")");
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&AccountId::new("carol")).unwrap();
        assert_eq!(json, "\"carol\"");
        let parsed: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, AccountId::new("carol"));
    }

    #[test]
    fn ordering_follows_string_ordering() {
        assert!(AccountId::new("alice") < AccountId::new("bob"));
    }
}
