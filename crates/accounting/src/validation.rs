//! Double-entry validation.
//!
//! [`TransactionValidator`] checks the transaction-level invariants and delegates
//! each side to [`EntrySetValidator`], which issues exactly one batched account
//! lookup per side.

use txledger_core::AccountId;

use crate::accounts::{AccountDirectory, AccountDirectoryError};
use crate::error::{LedgerError, LedgerResult};
use crate::transaction::{Posting, Transaction};

/// Validates one side (debits or credits) of a transaction.
#[derive(Debug)]
pub struct EntrySetValidator<'a, A: ?Sized> {
    accounts: &'a A,
}

impl<'a, A> EntrySetValidator<'a, A>
where
    A: AccountDirectory + ?Sized,
{
    pub fn new(accounts: &'a A) -> Self {
        Self { accounts }
    }

    /// Reject blank accounts, then check every distinct account in one lookup.
    pub fn validate(&self, postings: &[Posting]) -> LedgerResult<()> {
        if postings.iter().any(|p| p.account.is_blank()) {
            return Err(LedgerError::MissingAccount);
        }

        let mut requested: Vec<AccountId> = Vec::with_capacity(postings.len());
        for posting in postings {
            if !requested.contains(&posting.account) {
                requested.push(posting.account.clone());
            }
        }

        let verdicts = self.accounts.exists(&requested)?;
        if verdicts.len() != requested.len() {
            return Err(AccountDirectoryError::ResponseMismatch {
                expected: requested.len(),
                actual: verdicts.len(),
            }
            .into());
        }

        let offenders: Vec<AccountId> = requested
            .into_iter()
            .zip(verdicts)
            .filter_map(|(account, ok)| (!ok).then_some(account))
            .collect();

        if !offenders.is_empty() {
            return Err(LedgerError::AccountNotEligible(offenders));
        }
        Ok(())
    }

    /// Exact sum of the posting values.
    pub fn total(&self, postings: &[Posting]) -> LedgerResult<i64> {
        postings.iter().try_fold(0i64, |sum, p| {
            sum.checked_add(p.value).ok_or(LedgerError::AmountOverflow)
        })
    }
}

/// Validates a whole candidate transaction, stopping at the first failure.
#[derive(Debug)]
pub struct TransactionValidator<'a, A: ?Sized> {
    entries: EntrySetValidator<'a, A>,
}

impl<'a, A> TransactionValidator<'a, A>
where
    A: AccountDirectory + ?Sized,
{
    pub fn new(accounts: &'a A) -> Self {
        Self {
            entries: EntrySetValidator::new(accounts),
        }
    }

    pub fn validate(&self, transaction: &Transaction) -> LedgerResult<()> {
        if transaction.debits.is_empty() {
            return Err(LedgerError::MissingDebits);
        }
        if transaction.credits.is_empty() {
            return Err(LedgerError::MissingCredits);
        }
        if transaction.date.is_none() {
            return Err(LedgerError::MissingDate);
        }
        if transaction.memo.trim().is_empty() {
            return Err(LedgerError::MissingMemo);
        }

        self.entries.validate(&transaction.debits)?;
        self.entries.validate(&transaction.credits)?;

        let debits = self.entries.total(&transaction.debits)?;
        let credits = self.entries.total(&transaction.credits)?;
        if debits != credits {
            return Err(LedgerError::UnbalancedTransaction { debits, credits });
        }

        Ok(())
    }
}
