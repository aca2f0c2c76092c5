//! Transaction repository (application-level orchestration).
//!
//! The repository is the only component that writes to the ledger. It validates
//! candidates, turns amendments and deletions into reversals, and hands the
//! resulting records to the store as one atomic batch.
//!
//! ## Save Flow
//!
//! ```text
//! candidates
//!   ↓
//! 1. Validate each candidate (first failure aborts, nothing written)
//!   ↓
//! 2. For candidates carrying an id: load the stored version, refuse it if
//!    already reversed, prepare its reversal
//!   ↓
//! 3. Append [reversal?, new version] per candidate in ONE batch
//!    (ExpectedVersion::Exact when reversals are involved)
//!   ↓
//! 4. Return the new versions with their store-assigned ids
//! ```
//!
//! This module contains no IO itself; it composes the store and account
//! directory traits.

use std::collections::HashSet;

use chrono::Utc;
use thiserror::Error;

use txledger_accounting::{
    AccountDirectory, AccountDirectoryError, LedgerError, Transaction, TransactionValidator,
};
use txledger_core::{ExpectedVersion, TransactionId};

use crate::config::LedgerConfig;
use crate::store::{StoreError, TransactionStore};

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Coarse classification of a [`RepositoryError`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller's input is wrong; retrying the same call cannot succeed.
    Validation,
    /// The referenced transaction does not exist.
    NotFound,
    /// The ledger moved underneath the call (already reversed, concurrent write).
    Conflict,
    /// The store or the account directory failed.
    Infrastructure,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("invalid transaction: {0}")]
    Validation(LedgerError),

    #[error("transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    #[error("transaction {id} was already reversed by {reversal}")]
    AlreadyReversed {
        id: TransactionId,
        reversal: TransactionId,
    },

    #[error("transaction {0} is amended more than once in the same batch")]
    ConflictingAmendment(TransactionId),

    #[error("candidate reverses {0} directly; use delete to reverse a transaction")]
    ExplicitReversal(TransactionId),

    #[error("batch of {size} transactions exceeds the limit of {max}")]
    BatchTooLarge { size: usize, max: usize },

    #[error("concurrent modification: {0}")]
    Concurrency(String),

    #[error(transparent)]
    AccountDirectory(AccountDirectoryError),

    #[error(transparent)]
    Store(StoreError),
}

impl RepositoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RepositoryError::Validation(_)
            | RepositoryError::ConflictingAmendment(_)
            | RepositoryError::ExplicitReversal(_)
            | RepositoryError::BatchTooLarge { .. } => ErrorKind::Validation,
            RepositoryError::TransactionNotFound(_) => ErrorKind::NotFound,
            RepositoryError::AlreadyReversed { .. } | RepositoryError::Concurrency(_) => {
                ErrorKind::Conflict
            }
            RepositoryError::AccountDirectory(_) | RepositoryError::Store(_) => {
                ErrorKind::Infrastructure
            }
        }
    }
}

impl From<LedgerError> for RepositoryError {
    fn from(value: LedgerError) -> Self {
        match value {
            LedgerError::AccountDirectory(e) => RepositoryError::AccountDirectory(e),
            other => RepositoryError::Validation(other),
        }
    }
}

impl From<StoreError> for RepositoryError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Concurrency(msg) => RepositoryError::Concurrency(msg),
            StoreError::DuplicateReversal { target, existing } => RepositoryError::AlreadyReversed {
                id: target,
                reversal: existing,
            },
            other => RepositoryError::Store(other),
        }
    }
}

/// Validates and persists ledger transactions on top of an append-only store.
///
/// Holds no mutable state of its own: everything lives in the store, and every
/// call stands alone.
#[derive(Debug)]
pub struct TransactionRepository<S, A> {
    store: S,
    accounts: A,
    config: LedgerConfig,
}

impl<S, A> TransactionRepository<S, A> {
    pub fn new(store: S, accounts: A) -> Self {
        Self::with_config(store, accounts, LedgerConfig::default())
    }

    pub fn with_config(store: S, accounts: A, config: LedgerConfig) -> Self {
        Self {
            store,
            accounts,
            config,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_parts(self) -> (S, A) {
        (self.store, self.accounts)
    }
}

impl<S, A> TransactionRepository<S, A>
where
    S: TransactionStore,
    A: AccountDirectory,
{
    /// Validate and persist a batch of candidates.
    ///
    /// Candidates carrying an id are amendments: the stored version is reversed
    /// and the candidate is appended as a fresh record. Either every record of
    /// the call is appended or none is.
    #[tracing::instrument(skip_all, fields(candidates = candidates.len()))]
    pub fn save(&self, candidates: Vec<Transaction>) -> RepositoryResult<Vec<Transaction>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        if candidates.len() > self.config.max_batch_size {
            tracing::warn!(max = self.config.max_batch_size, "batch rejected: too large");
            return Err(RepositoryError::BatchTooLarge {
                size: candidates.len(),
                max: self.config.max_batch_size,
            });
        }

        let amends = candidates
            .iter()
            .any(|c| c.id.as_ref().is_some_and(|id| !id.is_blank()));
        let expected = self.expected_version(amends)?;
        let validator = TransactionValidator::new(&self.accounts);
        let as_of = Utc::now();

        let mut batch = Vec::with_capacity(candidates.len());
        let mut saved = Vec::with_capacity(candidates.len());
        let mut positions = Vec::with_capacity(candidates.len());
        let mut amended: HashSet<TransactionId> = HashSet::new();

        for (index, mut candidate) in candidates.into_iter().enumerate() {
            if let Err(e) = validator.validate(&candidate) {
                tracing::warn!(index, error = %e, "candidate rejected");
                return Err(e.into());
            }
            if let Some(target) = candidate.removes.take().filter(|t| !t.is_blank()) {
                tracing::warn!(index, %target, "candidate rejected: explicit reversal");
                return Err(RepositoryError::ExplicitReversal(target));
            }

            if let Some(previous) = candidate.id.take().filter(|id| !id.is_blank()) {
                if !amended.insert(previous.clone()) {
                    return Err(RepositoryError::ConflictingAmendment(previous));
                }
                let mut reversal = self.prepare_reversal(&previous)?;
                reversal.as_of = Some(as_of);
                tracing::debug!(index, %previous, "amendment reverses previous version");
                batch.push(reversal);
            }

            candidate.as_of = Some(as_of);
            positions.push(batch.len());
            saved.push(candidate.clone());
            batch.push(candidate);
        }

        let records = batch.len();
        let ids = self.append(batch, expected)?;
        if ids.len() != records {
            return Err(RepositoryError::Store(StoreError::InvalidAppend(format!(
                "store assigned {} ids for {records} records",
                ids.len()
            ))));
        }

        for (tx, position) in saved.iter_mut().zip(positions) {
            tx.id = Some(ids[position].clone());
        }

        tracing::info!(
            records,
            reversals = records - saved.len(),
            ids = ?ids,
            "batch appended"
        );
        Ok(saved)
    }

    /// Read one record back from the store.
    #[tracing::instrument(skip(self))]
    pub fn get(&self, id: &TransactionId) -> RepositoryResult<Option<Transaction>> {
        Ok(self.store.get(id)?)
    }

    /// Reverse a persisted transaction by appending its compensating entry.
    ///
    /// A transaction can be reversed once; later attempts fail with
    /// [`RepositoryError::AlreadyReversed`].
    #[tracing::instrument(skip(self))]
    pub fn delete(&self, id: &TransactionId) -> RepositoryResult<Transaction> {
        let expected = self.expected_version(true)?;

        let mut reversal = self.prepare_reversal(id)?;
        reversal.as_of = Some(Utc::now());

        let assigned = self
            .append(vec![reversal.clone()], expected)?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::InvalidAppend("store assigned no id".to_string()))?;

        tracing::info!(reversal = %assigned, "transaction reversed");
        reversal.id = Some(assigned);
        Ok(reversal)
    }

    fn expected_version(&self, reverses: bool) -> RepositoryResult<ExpectedVersion> {
        if reverses && self.config.optimistic_concurrency {
            Ok(ExpectedVersion::Exact(self.store.version()?))
        } else {
            Ok(ExpectedVersion::Any)
        }
    }

    fn append(
        &self,
        batch: Vec<Transaction>,
        expected: ExpectedVersion,
    ) -> RepositoryResult<Vec<TransactionId>> {
        self.store.append(batch, expected).map_err(|e| {
            match &e {
                StoreError::Concurrency(reason) => {
                    tracing::warn!(%reason, "append rejected: concurrent modification");
                }
                StoreError::DuplicateReversal { target, existing } => {
                    tracing::warn!(%target, %existing, "append rejected: already reversed");
                }
                other => tracing::error!(error = %other, "append failed"),
            }
            RepositoryError::from(e)
        })
    }

    fn prepare_reversal(&self, id: &TransactionId) -> RepositoryResult<Transaction> {
        let Some(original) = self.store.get(id)? else {
            tracing::warn!(%id, "reversal of unknown transaction");
            return Err(RepositoryError::TransactionNotFound(id.clone()));
        };

        if let Some(reversal) = self.store.reversal_of(id)? {
            tracing::warn!(%id, %reversal, "transaction already reversed");
            return Err(RepositoryError::AlreadyReversed {
                id: id.clone(),
                reversal,
            });
        }

        Ok(original.reversal(id))
    }
}
