//! Validation error taxonomy for ledger transactions.

use thiserror::Error;

use txledger_core::AccountId;

use crate::accounts::AccountDirectoryError;

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Why a candidate transaction was rejected.
///
/// Every variant except [`LedgerError::AccountDirectory`] is a user-input fault:
/// deterministic, never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("at least one debit must be informed")]
    MissingDebits,

    #[error("at least one credit must be informed")]
    MissingCredits,

    #[error("the date must be informed")]
    MissingDate,

    #[error("the memo must be informed")]
    MissingMemo,

    #[error("the account must be informed for each entry")]
    MissingAccount,

    #[error("account(s) not found or not eligible: {}", join_accounts(.0))]
    AccountNotEligible(Vec<AccountId>),

    #[error("debits ({debits}) must equal credits ({credits})")]
    UnbalancedTransaction { debits: i64, credits: i64 },

    #[error("amount overflow while totalling postings")]
    AmountOverflow,

    #[error(transparent)]
    AccountDirectory(#[from] AccountDirectoryError),
}

impl LedgerError {
    /// True for failures caused by the caller's input rather than infrastructure.
    pub fn is_input_fault(&self) -> bool {
        !matches!(self, LedgerError::AccountDirectory(_))
    }
}

fn join_accounts(accounts: &[AccountId]) -> String {
    accounts
        .iter()
        .map(AccountId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
