//! Append-only transaction store boundary.
//!
//! This module defines an infrastructure-facing abstraction for appending and
//! reading ledger records without making any storage assumptions.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryTransactionStore;
pub use r#trait::{StoreError, TransactionStore};
