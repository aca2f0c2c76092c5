//! Accounting module (double-entry transactions and their validation).
//!
//! Pure domain logic only: no IO, no persistence concerns. Account existence is
//! reached through the [`AccountDirectory`] boundary trait.

pub mod accounts;
pub mod error;
pub mod transaction;
pub mod validation;

pub use accounts::{AccountDirectory, AccountDirectoryError};
pub use error::{LedgerError, LedgerResult};
pub use transaction::{Posting, Transaction};
pub use validation::{EntrySetValidator, TransactionValidator};
