//! Infrastructure layer: the append-only store boundary, in-memory adapters,
//! configuration, and the transaction repository that ties them together.

pub mod account_directory;
pub mod config;
pub mod repository;
pub mod store;


pub use account_directory::InMemoryAccountDirectory;
pub use config::LedgerConfig;
pub use repository::{ErrorKind, RepositoryError, RepositoryResult, TransactionRepository};
pub use store::{InMemoryTransactionStore, StoreError, TransactionStore};
