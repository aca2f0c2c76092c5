//! In-memory account directory.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use txledger_accounting::{AccountDirectory, AccountDirectoryError};
use txledger_core::AccountId;

/// Account directory backed by a map of account -> eligible flag.
///
/// Unknown accounts are reported as not eligible. Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryAccountDirectory {
    accounts: RwLock<HashMap<AccountId, bool>>,
}

impl InMemoryAccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory where every given account exists and is eligible.
    pub fn from_accounts<I, T>(accounts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<AccountId>,
    {
        let accounts = accounts.into_iter().map(|a| (a.into(), true)).collect();
        Self {
            accounts: RwLock::new(accounts),
        }
    }

    pub fn insert(&self, account: impl Into<AccountId>, eligible: bool) {
        self.accounts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(account.into(), eligible);
    }

    /// Keep the account known but refuse further postings to it.
    pub fn disable(&self, account: impl Into<AccountId>) {
        self.insert(account, false);
    }
}

impl AccountDirectory for InMemoryAccountDirectory {
    fn exists(&self, accounts: &[AccountId]) -> Result<Vec<bool>, AccountDirectoryError> {
        let known = self
            .accounts
            .read()
            .map_err(|_| AccountDirectoryError::Unavailable("lock poisoned".to_string()))?;

        Ok(accounts
            .iter()
            .map(|account| known.get(account).copied().unwrap_or(false))
            .collect())
    }
}
