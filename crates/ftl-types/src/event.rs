use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::identity::AccountId;
use crate::quantity::Quantity;

/// Name under which an event is published on the host bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventName {
    Transfer,
    Approval,
}

impl EventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transfer => "Transfer",
            Self::Approval => "Approval",
        }
    }

    /// Resolve a bus event name. Names are case-sensitive.
    pub fn parse(name: &str) -> Result<Self, TypeError> {
        match name {
            "Transfer" => Ok(Self::Transfer),
            "Approval" => Ok(Self::Approval),
            other => Err(TypeError::UnknownEvent(other.to_string())),
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tokens moved from one account to another.
///
/// At genesis `from` is the empty [`AccountId::mint`] identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEvent {
    pub from: AccountId,
    pub to: AccountId,
    pub value: Quantity,
}

/// An owner set the amount a spender may move on its behalf.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalEvent {
    pub owner: AccountId,
    pub spender: AccountId,
    pub value: Quantity,
}

/// A domain event describing a successful ledger mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    Transfer(TransferEvent),
    Approval(ApprovalEvent),
}

impl LedgerEvent {
    pub fn transfer(from: AccountId, to: AccountId, value: Quantity) -> Self {
        Self::Transfer(TransferEvent { from, to, value })
    }

    pub fn approval(owner: AccountId, spender: AccountId, value: Quantity) -> Self {
        Self::Approval(ApprovalEvent {
            owner,
            spender,
            value,
        })
    }

    pub fn name(&self) -> EventName {
        match self {
            Self::Transfer(_) => EventName::Transfer,
            Self::Approval(_) => EventName::Approval,
        }
    }

    /// JSON object payload as published on the bus, e.g.
    /// `{"from":"alice","to":"bob","value":1000}`.
    pub fn to_payload(&self) -> Result<Vec<u8>, TypeError> {
        let bytes = match self {
            Self::Transfer(t) => serde_json::to_vec(t),
            Self::Approval(a) => serde_json::to_vec(a),
        };
        bytes.map_err(|e| TypeError::Serialization(e.to_string()))
    }

    /// Decode a bus payload given the name it was published under.
    pub fn from_payload(name: &str, payload: &[u8]) -> Result<Self, TypeError> {
        let decoded = match EventName::parse(name)? {
            EventName::Transfer => serde_json::from_slice(payload).map(Self::Transfer),
            EventName::Approval => serde_json::from_slice(payload).map(Self::Approval),
        };
        decoded.map_err(|e| TypeError::Serialization(e.to_string()))
    }
}

impl fmt::Display for LedgerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transfer(t) => write!(f, "Transfer {} -> {}: {}", t.from, t.to, t.value),
            Self::Approval(a) => {
                write!(f, "Approval {} -> {}: {}", a.owner, a.spender, a.value)
            }
        }
    }
}
