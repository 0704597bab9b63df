//! Key-value storage for the Fungible Token Ledger.
//!
//! The ledger engine never owns its durability. It reads and writes opaque
//! byte values under string keys through the [`KeyValueStore`] trait, and the
//! host decides what sits behind it.
//!
//! # Storage Backends
//!
//! - [`InMemoryKvStore`] -- `BTreeMap`-based store for tests, the CLI, and embedding
//! - [`Transaction`] -- per-invocation overlay with read-your-writes and
//!   all-or-nothing commit onto any backend
//!
//! # Design Rules
//!
//! 1. Absence is not an error: `get` returns `Ok(None)` for unknown keys.
//! 2. The store never interprets values -- it is a pure key-value store.
//! 3. Writes issued inside a transaction are invisible to other readers
//!    until commit.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod memory;
pub mod snapshot;
pub mod traits;
pub mod txn;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryKvStore;
pub use snapshot::Snapshot;
pub use traits::KeyValueStore;
pub use txn::Transaction;
