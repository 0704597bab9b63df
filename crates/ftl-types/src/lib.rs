//! Foundation types for the Fungible Token Ledger (FTL).
//!
//! This crate provides the identity, quantity, and event types shared by the
//! ledger engine, its storage adapters, and the host runtime. Every other FTL
//! crate depends on `ftl-types`.
//!
//! # Key Types
//!
//! - [`AccountId`] -- Opaque principal identity supplied by the host
//! - [`Quantity`] -- Unsigned 64-bit token amount
//! - [`LedgerEvent`] -- `Transfer` / `Approval` notifications emitted after a mutation

pub mod error;
pub mod event;
pub mod identity;
pub mod quantity;

pub use error::TypeError;
pub use event::{ApprovalEvent, EventName, LedgerEvent, TransferEvent};
pub use identity::AccountId;
pub use quantity::{format_quantity, parse_canonical_quantity, parse_quantity, Quantity};
