use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use txledger_core::{AccountId, TransactionId, UserId};

/// One line of a transaction (immutable value).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Posting {
    pub account: AccountId,
    /// Signed amount in minor currency units (e.g., cents).
    pub value: i64,
}

impl Posting {
    pub fn new(account: impl Into<AccountId>, value: i64) -> Self {
        Self {
            account: account.into(),
            value,
        }
    }
}

/// A double-entry transaction, either a candidate or a persisted record.
///
/// Candidates carry no `id`; the store assigns one on append. Persisted records
/// are never modified: amendments and deletions are expressed as new records,
/// with reversals pointing at the record they negate through `removes`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub id: Option<TransactionId>,
    pub debits: Vec<Posting>,
    pub credits: Vec<Posting>,
    pub date: Option<DateTime<Utc>>,
    pub memo: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: BTreeSet<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub user: Option<UserId>,
    /// When the record was appended to the ledger.
    #[serde(rename = "timestamp")]
    pub as_of: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub removes: Option<TransactionId>,
}

/// Identifiers arrive as `""` when unset; an empty string never names a record.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()).map(T::from))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<BTreeSet<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Transaction {
    /// Start a candidate transaction with no postings.
    pub fn new(date: DateTime<Utc>, memo: impl Into<String>) -> Self {
        Self {
            date: Some(date),
            memo: memo.into(),
            ..Self::default()
        }
    }

    pub fn with_debit(mut self, account: impl Into<AccountId>, value: i64) -> Self {
        self.debits.push(Posting::new(account, value));
        self
    }

    pub fn with_credit(mut self, account: impl Into<AccountId>, value: i64) -> Self {
        self.credits.push(Posting::new(account, value));
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn with_user(mut self, user: impl Into<UserId>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn is_reversal(&self) -> bool {
        self.removes.as_ref().is_some_and(|target| !target.is_blank())
    }

    /// Build the compensating entry for this transaction, persisted as `original`.
    ///
    /// The old credits become the debits and vice versa; every other descriptive
    /// field is carried over. The result has no id and no `as_of` yet.
    pub fn reversal(&self, original: &TransactionId) -> Self {
        Self {
            id: None,
            debits: self.credits.clone(),
            credits: self.debits.clone(),
            date: self.date,
            memo: self.memo.clone(),
            tags: self.tags.clone(),
            user: self.user.clone(),
            as_of: None,
            removes: Some(original.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn builder_collects_postings_in_order() {
        let tx = Transaction::new(test_time(), "rent")
            .with_debit("5000", 700)
            .with_debit("5100", 300)
            .with_credit("1000", 1000)
            .with_tag("monthly")
            .with_user("alice");

        assert_eq!(tx.debits, vec![Posting::new("5000", 700), Posting::new("5100", 300)]);
        assert_eq!(tx.credits, vec![Posting::new("1000", 1000)]);
        assert!(tx.tags.contains("monthly"));
        assert_eq!(tx.user, Some(UserId::from("alice")));
        assert!(tx.id.is_none());
        assert!(!tx.is_reversal());
    }

    #[test]
    fn reversal_swaps_sides_and_points_at_original() {
        let mut original = Transaction::new(test_time(), "m")
            .with_debit("1", 1)
            .with_credit("2", 1)
            .with_tag("t");
        original.id = Some(TransactionId::from("0"));
        original.as_of = Some(test_time());

        let reversal = original.reversal(&TransactionId::from("0"));

        assert_eq!(reversal.debits, vec![Posting::new("2", 1)]);
        assert_eq!(reversal.credits, vec![Posting::new("1", 1)]);
        assert_eq!(reversal.removes, Some(TransactionId::from("0")));
        assert_eq!(reversal.memo, "m");
        assert_eq!(reversal.tags, original.tags);
        assert!(reversal.id.is_none());
        assert!(reversal.as_of.is_none());
        assert!(reversal.is_reversal());
    }

    #[test]
    fn clones_do_not_share_postings() {
        let original = Transaction::new(test_time(), "m").with_debit("1", 5).with_credit("2", 5);
        let mut copy = original.clone();
        copy.debits[0].value = 99;
        copy.credits.push(Posting::new("3", 1));

        assert_eq!(original.debits[0].value, 5);
        assert_eq!(original.credits.len(), 1);
    }

    #[test]
    fn serializes_with_ledger_field_names() {
        let mut tx = Transaction::new(test_time(), "m").with_debit("1", 1).with_credit("2", 1);
        tx.as_of = Some(test_time());

        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["debits"][0]["account"], "1");
        assert_eq!(json["debits"][0]["value"], 1);
        assert!(json.get("timestamp").is_some());
        assert!(json.get("as_of").is_none());

        let back: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(back, tx);
    }

    #[test]
    fn empty_identifiers_and_null_tags_read_as_absent() {
        let json = r#"{
            "id": "",
            "debits": [{"account": "1", "value": 5}],
            "credits": [{"account": "2", "value": 5}],
            "date": "2024-03-01T12:00:00Z",
            "memo": "m",
            "tags": null,
            "user": "",
            "timestamp": null,
            "removes": ""
        }"#;

        let tx: Transaction = serde_json::from_str(json).unwrap();

        assert_eq!(tx.id, None);
        assert_eq!(tx.user, None);
        assert_eq!(tx.removes, None);
        assert!(tx.tags.is_empty());
        assert!(!tx.is_reversal());
        assert_eq!(tx.date, Some(test_time()));
    }

    #[test]
    fn missing_optional_fields_default() {
        let json = r#"{"debits": [], "credits": [], "date": null, "memo": ""}"#;

        let tx: Transaction = serde_json::from_str(json).unwrap();

        assert_eq!(tx, Transaction::default());
    }

    fn arb_postings() -> impl Strategy<Value = Vec<Posting>> {
        prop::collection::vec(("[0-9]{1,4}", -1_000_000i64..1_000_000i64), 1..6).prop_map(|lines| {
            lines
                .into_iter()
                .map(|(account, value)| Posting::new(account, value))
                .collect()
        })
    }

    proptest! {
        /// Property: reversing a reversal restores the original sides.
        #[test]
        fn double_reversal_restores_sides(debits in arb_postings(), credits in arb_postings()) {
            let original = Transaction {
                debits,
                credits,
                date: Some(test_time()),
                memo: "m".to_string(),
                ..Transaction::default()
            };

            let once = original.reversal(&TransactionId::from("0"));
            let twice = once.reversal(&TransactionId::from("1"));

            prop_assert_eq!(&once.debits, &original.credits);
            prop_assert_eq!(&once.credits, &original.debits);
            prop_assert_eq!(twice.debits, original.debits);
            prop_assert_eq!(twice.credits, original.credits);
        }
    }
}
