use std::sync::Arc;

use thiserror::Error;

use txledger_accounting::Transaction;
use txledger_core::{ExpectedVersion, TransactionId};

/// Transaction store operation error.
///
/// These are **infrastructure errors** (storage, concurrency, integrity) as
/// opposed to ledger validation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    #[error("transaction {target} is already reversed by {existing}")]
    DuplicateReversal {
        target: TransactionId,
        existing: TransactionId,
    },

    #[error("invalid append: {0}")]
    InvalidAppend(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Append-only ledger store.
///
/// Records are never updated or removed. Identities are assigned by the store,
/// unique, and stable once returned.
///
/// ## Append Semantics
///
/// `append()`:
/// - checks the optimistic concurrency expectation against `version()`
/// - assigns one identity per record, returned in input order
/// - persists the batch atomically (all or nothing)
///
/// ## Read Semantics
///
/// - `get()` on an unknown identity returns `Ok(None)`, not an error
/// - `reversal_of()` returns the identity of the record whose `removes` points at
///   the given identity, if any
pub trait TransactionStore: Send + Sync {
    fn get(&self, id: &TransactionId) -> Result<Option<Transaction>, StoreError>;

    fn append(
        &self,
        records: Vec<Transaction>,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<TransactionId>, StoreError>;

    /// Number of records appended so far.
    fn version(&self) -> Result<u64, StoreError>;

    fn reversal_of(&self, id: &TransactionId) -> Result<Option<TransactionId>, StoreError>;
}

impl<S> TransactionStore for Arc<S>
where
    S: TransactionStore + ?Sized,
{
    fn get(&self, id: &TransactionId) -> Result<Option<Transaction>, StoreError> {
        (**self).get(id)
    }

    fn append(
        &self,
        records: Vec<Transaction>,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<TransactionId>, StoreError> {
        (**self).append(records, expected_version)
    }

    fn version(&self) -> Result<u64, StoreError> {
        (**self).version()
    }

    fn reversal_of(&self, id: &TransactionId) -> Result<Option<TransactionId>, StoreError> {
        (**self).reversal_of(id)
    }
}
