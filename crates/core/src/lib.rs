//! `txledger-core` — shared building blocks for the ledger workspace.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod version;

pub use error::{DomainError, DomainResult};
pub use id::{AccountId, TransactionId, UserId};
pub use version::ExpectedVersion;
