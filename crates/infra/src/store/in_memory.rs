use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use txledger_accounting::Transaction;
use txledger_core::{ExpectedVersion, TransactionId};

use super::r#trait::{StoreError, TransactionStore};

#[derive(Debug, Default)]
struct Log {
    records: Vec<Transaction>,
    /// reversed id -> id of the reversal record
    reversals: HashMap<TransactionId, TransactionId>,
}

impl Log {
    fn find(&self, id: &TransactionId) -> Option<&Transaction> {
        let index: usize = id.as_str().parse().ok()?;
        self.records
            .get(index)
            .filter(|record| record.id.as_ref() == Some(id))
    }
}

/// In-memory append-only transaction store.
///
/// Identities are the decimal position of the record in the log (`"0"`, `"1"`,
/// ...). Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryTransactionStore {
    log: RwLock<Log>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.log.read().unwrap_or_else(PoisonError::into_inner).records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every record, in append order.
    pub fn records(&self) -> Vec<Transaction> {
        self.log
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .records
            .clone()
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

impl TransactionStore for InMemoryTransactionStore {
    fn get(&self, id: &TransactionId) -> Result<Option<Transaction>, StoreError> {
        let log = self.log.read().map_err(poisoned)?;
        Ok(log.find(id).cloned())
    }

    fn append(
        &self,
        records: Vec<Transaction>,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<TransactionId>, StoreError> {
        if records.is_empty() {
            return Ok(vec![]);
        }

        let mut log = self.log.write().map_err(poisoned)?;
        let current = log.records.len() as u64;

        expected_version
            .check(current)
            .map_err(|e| StoreError::Concurrency(e.to_string()))?;

        // Validate the whole batch before touching the log.
        let mut pending: HashMap<&TransactionId, TransactionId> = HashMap::new();
        for (offset, record) in records.iter().enumerate() {
            if let Some(id) = &record.id {
                return Err(StoreError::InvalidAppend(format!(
                    "record at index {offset} already carries id {id}"
                )));
            }

            let Some(target) = &record.removes else {
                continue;
            };
            if log.find(target).is_none() {
                return Err(StoreError::InvalidAppend(format!(
                    "record at index {offset} reverses unknown transaction {target}"
                )));
            }
            if let Some(existing) = log.reversals.get(target).or_else(|| pending.get(target)) {
                return Err(StoreError::DuplicateReversal {
                    target: target.clone(),
                    existing: existing.clone(),
                });
            }
            let assigned = TransactionId::new((log.records.len() + offset).to_string());
            pending.insert(target, assigned);
        }
        let pending: Vec<(TransactionId, TransactionId)> = pending
            .into_iter()
            .map(|(target, id)| (target.clone(), id))
            .collect();

        let mut ids = Vec::with_capacity(records.len());
        for mut record in records {
            let id = TransactionId::new(log.records.len().to_string());
            record.id = Some(id.clone());
            log.records.push(record);
            ids.push(id);
        }
        log.reversals.extend(pending);

        Ok(ids)
    }

    fn version(&self) -> Result<u64, StoreError> {
        let log = self.log.read().map_err(poisoned)?;
        Ok(log.records.len() as u64)
    }

    fn reversal_of(&self, id: &TransactionId) -> Result<Option<TransactionId>, StoreError> {
        let log = self.log.read().map_err(poisoned)?;
        Ok(log.reversals.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn tx(memo: &str) -> Transaction {
        Transaction::new(Utc::now(), memo).with_debit("1", 1).with_credit("2", 1)
    }

    fn id(value: &str) -> TransactionId {
        TransactionId::from(value)
    }

    #[test]
    fn append_assigns_sequential_ids_in_order() {
        let store = InMemoryTransactionStore::new();

        let first = store.append(vec![tx("a")], ExpectedVersion::Any).unwrap();
        let rest = store.append(vec![tx("b"), tx("c")], ExpectedVersion::Any).unwrap();

        assert_eq!(first, vec![id("0")]);
        assert_eq!(rest, vec![id("1"), id("2")]);
        assert_eq!(store.len(), 3);
        assert_eq!(store.get(&id("2")).unwrap().unwrap().memo, "c");
    }

    #[test]
    fn get_unknown_is_none() {
        let store = InMemoryTransactionStore::new();
        store.append(vec![tx("a")], ExpectedVersion::Any).unwrap();

        assert_eq!(store.get(&id("1")).unwrap(), None);
        assert_eq!(store.get(&id("x")).unwrap(), None);
        assert_eq!(store.get(&id("00")).unwrap(), None);
    }

    #[test]
    fn get_returns_an_owned_copy() {
        let store = InMemoryTransactionStore::new();
        store.append(vec![tx("a")], ExpectedVersion::Any).unwrap();

        let mut copy = store.get(&id("0")).unwrap().unwrap();
        copy.debits[0].value = 500;

        assert_eq!(store.get(&id("0")).unwrap().unwrap().debits[0].value, 1);
    }

    #[test]
    fn stale_version_is_rejected_atomically() {
        let store = InMemoryTransactionStore::new();
        store.append(vec![tx("a")], ExpectedVersion::Exact(0)).unwrap();

        let err = store
            .append(vec![tx("b"), tx("c")], ExpectedVersion::Exact(0))
            .unwrap_err();

        assert!(matches!(err, StoreError::Concurrency(_)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.version().unwrap(), 1);
    }

    #[test]
    fn records_with_ids_are_rejected() {
        let store = InMemoryTransactionStore::new();
        let mut record = tx("a");
        record.id = Some(id("7"));

        let err = store.append(vec![tx("ok"), record], ExpectedVersion::Any).unwrap_err();

        assert!(matches!(err, StoreError::InvalidAppend(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn tracks_reversals_and_refuses_a_second_one() {
        let store = InMemoryTransactionStore::new();
        store.append(vec![tx("a")], ExpectedVersion::Any).unwrap();
        let original = store.get(&id("0")).unwrap().unwrap();

        let ids = store
            .append(vec![original.reversal(&id("0"))], ExpectedVersion::Any)
            .unwrap();
        assert_eq!(store.reversal_of(&id("0")).unwrap(), Some(ids[0].clone()));

        let err = store
            .append(vec![original.reversal(&id("0"))], ExpectedVersion::Any)
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::DuplicateReversal {
                target: id("0"),
                existing: id("1"),
            }
        );
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn duplicate_reversal_within_one_batch_is_rejected() {
        let store = InMemoryTransactionStore::new();
        store.append(vec![tx("a")], ExpectedVersion::Any).unwrap();
        let original = store.get(&id("0")).unwrap().unwrap();

        let err = store
            .append(
                vec![original.reversal(&id("0")), original.reversal(&id("0"))],
                ExpectedVersion::Any,
            )
            .unwrap_err();

        assert!(matches!(err, StoreError::DuplicateReversal { .. }));
        assert_eq!(store.len(), 1);
        assert_eq!(store.reversal_of(&id("0")).unwrap(), None);
    }

    #[test]
    fn snapshots_survive_a_poisoned_lock() {
        let store = std::sync::Arc::new(InMemoryTransactionStore::new());
        store.append(vec![tx("a")], ExpectedVersion::Any).unwrap();

        let holder = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = holder.log.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();

        assert_eq!(store.len(), 1);
        assert_eq!(store.records()[0].memo, "a");
        assert!(matches!(store.get(&id("0")), Err(StoreError::Unavailable(_))));
    }

    #[test]
    fn reversal_of_unknown_target_is_rejected() {
        let store = InMemoryTransactionStore::new();
        let orphan = tx("a").reversal(&id("42"));

        let err = store.append(vec![orphan], ExpectedVersion::Any).unwrap_err();

        assert!(matches!(err, StoreError::InvalidAppend(_)));
    }
}
