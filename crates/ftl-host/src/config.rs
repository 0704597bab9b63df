use std::path::Path;

use ftl_ledger::LedgerConfig;
use serde::{Deserialize, Serialize};

use crate::error::{HostError, HostResult};

/// Host runtime configuration, usually read from `ftl.toml`.
///
/// ```toml
/// identity_attribute = "CN"
///
/// [ledger]
/// total_supply = 100000000
/// genesis_policy = "reject"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Engine configuration.
    pub ledger: LedgerConfig,
    /// Subject attribute of a certificate credential that names the caller.
    pub identity_attribute: String,
    /// Capacity hint for the in-memory event history kept by the bus.
    pub event_history: usize,
    /// Undelivered events queued per subscriber before new ones are dropped.
    pub subscriber_queue: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            ledger: LedgerConfig::default(),
            identity_attribute: "CN".into(),
            event_history: 1024,
            subscriber_queue: 1024,
        }
    }
}

impl HostConfig {
    pub fn from_toml_str(text: &str) -> HostResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| HostError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> HostResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> HostResult<()> {
        if self.identity_attribute.trim().is_empty() {
            return Err(HostError::Config("identity_attribute must not be empty".into()));
        }
        if self.ledger.total_supply == 0 {
            return Err(HostError::Config("ledger.total_supply must be positive".into()));
        }
        if self.subscriber_queue == 0 {
            return Err(HostError::Config("subscriber_queue must be positive".into()));
        }
        Ok(())
    }
}
