use serde::{Deserialize, Serialize};

/// Supply minted at genesis when no configuration overrides it.
pub const DEFAULT_TOTAL_SUPPLY: u64 = 100_000_000;

/// What `init` does when the ledger already has a genesis owner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenesisPolicy {
    /// Fail with `AlreadyInitialized` and leave state untouched.
    #[default]
    Reject,
    /// Set the named owner's balance to the total supply again and re-emit
    /// the genesis event. Matches ledgers deployed before genesis was
    /// recorded; it does not preserve conservation.
    Overwrite,
}

/// Configuration for the token ledger engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Fixed supply minted to the genesis owner.
    pub total_supply: u64,
    /// Behaviour of repeated `init` calls.
    pub genesis_policy: GenesisPolicy,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            total_supply: DEFAULT_TOTAL_SUPPLY,
            genesis_policy: GenesisPolicy::Reject,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = LedgerConfig::default();
        assert_eq!(c.total_supply, 100_000_000);
        assert_eq!(c.genesis_policy, GenesisPolicy::Reject);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let c: LedgerConfig = toml::from_str("total_supply = 5000").unwrap();
        assert_eq!(c.total_supply, 5000);
        assert_eq!(c.genesis_policy, GenesisPolicy::Reject);
    }

    #[test]
    fn policy_is_snake_case() {
        let c: LedgerConfig = toml::from_str("genesis_policy = \"overwrite\"").unwrap();
        assert_eq!(c.genesis_policy, GenesisPolicy::Overwrite);
        assert_eq!(c.total_supply, DEFAULT_TOTAL_SUPPLY);
    }
}
