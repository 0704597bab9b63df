//! Reference host runtime for the Fungible Token Ledger.
//!
//! The ledger engine expects a host that verifies callers, wraps each
//! invocation in a storage transaction, and delivers events. This crate is
//! that host for tests, the CLI, and embedding:
//!
//! - [`Credential`] / [`CredentialResolver`] -- caller identity from a verified credential
//! - [`EventBus`] -- fan-out of committed events to subscribers
//! - [`Runtime`] -- transaction-per-invocation dispatch with panic containment
//! - [`Response`] -- the protocol-level result handed back to clients

pub mod auth;
pub mod bus;
pub mod config;
pub mod error;
pub mod response;
pub mod runtime;

pub use auth::{Credential, CredentialResolver};
pub use bus::{EventBus, EventBuffer, EventFilter, PublishedEvent, Subscription};
pub use config::HostConfig;
pub use error::{HostError, HostResult};
pub use response::{Response, Status};
pub use runtime::Runtime;
