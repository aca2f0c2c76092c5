//! Account existence boundary.

use std::sync::Arc;

use thiserror::Error;

use txledger_core::AccountId;

/// Failure reported by (or about) an account directory.
///
/// These are **infrastructure errors**, as opposed to the eligibility verdicts
/// the directory returns on success.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountDirectoryError {
    #[error("account directory unavailable: {0}")]
    Unavailable(String),

    #[error("account directory answered {actual} results for {expected} accounts")]
    ResponseMismatch { expected: usize, actual: usize },
}

/// Batched account existence/eligibility lookup.
///
/// Callers pass every account they need in one call; implementations return one
/// verdict per input identifier, in input order. A `false` verdict means the
/// account does not exist or may not receive postings.
pub trait AccountDirectory: Send + Sync {
    fn exists(&self, accounts: &[AccountId]) -> Result<Vec<bool>, AccountDirectoryError>;
}

impl<A> AccountDirectory for Arc<A>
where
    A: AccountDirectory + ?Sized,
{
    fn exists(&self, accounts: &[AccountId]) -> Result<Vec<bool>, AccountDirectoryError> {
        (**self).exists(accounts)
    }
}
