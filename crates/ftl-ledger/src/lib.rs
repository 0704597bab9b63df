//! Token ledger engine for the Fungible Token Ledger (FTL).
//!
//! This crate is the heart of FTL. It provides:
//! - The arithmetic guard (`checked_add` / `checked_sub`) every mutation goes through
//! - Deterministic storage key derivation and decimal quantity encoding
//! - `AccountStore`, the balance/allowance accessor with fail-closed write staging
//! - `TokenLedger`, the named-operation dispatcher (`init`, `transfer`, `approve`, ...)
//! - `IdentityResolver` / `EventSink` trait boundaries towards the host runtime
//!
//! The engine owns no durability, transport, or identity verification. It
//! reads and writes through the host's [`ftl_store::KeyValueStore`] and
//! assumes the host wraps each invocation in a transaction.

pub mod accessor;
pub mod arith;
pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod keys;
pub mod operation;
pub mod traits;

pub use accessor::AccountStore;
pub use arith::{checked_add, checked_sub};
pub use config::{GenesisPolicy, LedgerConfig, DEFAULT_TOTAL_SUPPLY};
pub use engine::{InvocationContext, Outcome, TokenLedger};
pub use error::{HostFault, LedgerError, LedgerResult};
pub use operation::Operation;
pub use traits::{EventSink, IdentityResolver};
