//! In-memory normalized store.
//!
//! [`NormalizedStore`] keeps every record in an ordered map so snapshots and
//! key listings are deterministic. It is the only backend; the cache facade
//! owns one behind a lock.

use std::collections::btree_map::{self, BTreeMap, Entry};
use std::fmt;

use gnc_types::{FieldRecord, FieldValue, StoreKey};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::integrity::{self, DanglingReference};
use crate::traits::RecordStore;

/// Ordered in-memory implementation of [`RecordStore`].
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedStore {
    records: BTreeMap<StoreKey, FieldRecord>,
}

impl NormalizedStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterate over all records in key order.
    pub fn records(&self) -> btree_map::Iter<'_, StoreKey, FieldRecord> {
        self.records.iter()
    }

    /// Look up a record, failing if it is absent.
    pub fn record(&self, key: &StoreKey) -> StoreResult<&FieldRecord> {
        self.records
            .get(key)
            .ok_or_else(|| StoreError::NotFound(key.clone()))
    }

    /// Serialize the whole store as a JSON snapshot.
    pub fn to_json(&self) -> StoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rebuild a store from a JSON snapshot produced by [`to_json`](Self::to_json).
    pub fn from_json(json: &str) -> StoreResult<Self> {
        let store: NormalizedStore = serde_json::from_str(json)?;
        store.validate()?;
        Ok(store)
    }

    /// Reject snapshots containing empty keys, including empty reference targets.
    pub fn validate(&self) -> StoreResult<()> {
        for (key, record) in &self.records {
            if key.as_str().is_empty() {
                return Err(StoreError::InvalidSnapshot {
                    reason: "empty store key".into(),
                });
            }
            for value in record.values() {
                if value.references().iter().any(|r| r.as_str().is_empty()) {
                    return Err(StoreError::InvalidSnapshot {
                        reason: format!("record {key} holds a reference with an empty key"),
                    });
                }
            }
        }
        Ok(())
    }

    /// References whose target record is absent.
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        integrity::dangling_references(self)
    }

    /// Keys of records holding at least one reference to `key`.
    pub fn referrers(&self, key: &StoreKey) -> Vec<StoreKey> {
        integrity::referrers(self, key)
    }
}

impl RecordStore for NormalizedStore {
    fn get(&self, key: &StoreKey) -> Option<&FieldRecord> {
        self.records.get(key)
    }

    fn merge(&mut self, key: StoreKey, record: FieldRecord) -> bool {
        match self.records.entry(key) {
            Entry::Occupied(mut existing) => existing.get_mut().merge(record),
            Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
        }
    }

    fn set_field(&mut self, key: &StoreKey, field: &str, value: FieldValue) -> bool {
        match self.records.get_mut(key) {
            Some(record) => {
                if record.get(field) == Some(&value) {
                    false
                } else {
                    record.insert(field, value);
                    true
                }
            }
            None => {
                let mut record = FieldRecord::new();
                record.insert(field, value);
                self.records.insert(key.clone(), record);
                true
            }
        }
    }

    fn remove(&mut self, key: &StoreKey) -> Option<FieldRecord> {
        self.records.remove(key)
    }

    fn keys(&self) -> Vec<StoreKey> {
        self.records.keys().cloned().collect()
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn clear(&mut self) {
        self.records.clear();
    }
}

impl fmt::Debug for NormalizedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalizedStore")
            .field("record_count", &self.records.len())
            .finish()
    }
}

impl FromIterator<(StoreKey, FieldRecord)> for NormalizedStore {
    fn from_iter<I: IntoIterator<Item = (StoreKey, FieldRecord)>>(iter: I) -> Self {
        let mut store = NormalizedStore::new();
        for (key, record) in iter {
            store.merge(key, record);
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(pairs: &[(&str, FieldValue)]) -> FieldRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn scalar(v: serde_json::Value) -> FieldValue {
        FieldValue::Scalar(v)
    }

    // -----------------------------------------------------------------------
    // RecordStore basics
    // -----------------------------------------------------------------------

    #[test]
    fn new_store_is_empty() {
        let store = NormalizedStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert!(store.get(&StoreKey::root_query()).is_none());
    }

    #[test]
    fn merge_creates_then_merges() {
        let mut store = NormalizedStore::new();
        let key = StoreKey::new("Todo3");
        assert!(store.merge(
            key.clone(),
            record(&[("id", scalar(json!("3"))), ("title", scalar(json!("a")))])
        ));
        assert!(store.merge(key.clone(), record(&[("done", scalar(json!(true)))])));

        let stored = store.get(&key).unwrap();
        assert_eq!(stored.len(), 3);
        assert_eq!(stored.get("title"), Some(&scalar(json!("a"))));
    }

    #[test]
    fn merge_of_identical_fields_reports_no_change() {
        let mut store = NormalizedStore::new();
        let key = StoreKey::new("Todo3");
        store.merge(key.clone(), record(&[("id", scalar(json!("3")))]));
        assert!(!store.merge(key, record(&[("id", scalar(json!("3")))])));
    }

    #[test]
    fn set_field_creates_record() {
        let mut store = NormalizedStore::new();
        let key = StoreKey::new("TodoList5");
        let list = FieldValue::List(vec![FieldValue::Reference(StoreKey::new("Todo3"))]);
        assert!(store.set_field(&key, "todos", list.clone()));
        assert_eq!(store.get_field(&key, "todos"), Some(&list));
        assert!(!store.set_field(&key, "todos", list));
    }

    #[test]
    fn remove_leaves_referrers_alone() {
        let mut store = NormalizedStore::new();
        store.merge(
            StoreKey::root_query(),
            record(&[("todo", FieldValue::Reference(StoreKey::new("Todo3")))]),
        );
        store.merge(StoreKey::new("Todo3"), record(&[("id", scalar(json!("3")))]));

        assert!(store.remove(&StoreKey::new("Todo3")).is_some());
        assert!(store.remove(&StoreKey::new("Todo3")).is_none());
        assert_eq!(
            store.get_field(&StoreKey::root_query(), "todo"),
            Some(&FieldValue::Reference(StoreKey::new("Todo3")))
        );
    }

    #[test]
    fn keys_are_sorted_and_clear_empties() {
        let mut store: NormalizedStore = vec![
            (StoreKey::new("b"), FieldRecord::new()),
            (StoreKey::new("a"), FieldRecord::new()),
        ]
        .into_iter()
        .collect();
        assert_eq!(store.keys(), vec![StoreKey::new("a"), StoreKey::new("b")]);
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn record_lookup_error() {
        let store = NormalizedStore::new();
        let err = store.record(&StoreKey::new("nope")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn debug_shows_count() {
        let mut store = NormalizedStore::new();
        store.merge(StoreKey::new("a"), FieldRecord::new());
        assert_eq!(format!("{store:?}"), "NormalizedStore { record_count: 1 }");
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    #[test]
    fn snapshot_round_trip() {
        let mut store = NormalizedStore::new();
        store.merge(
            StoreKey::new("TodoList5"),
            record(&[(
                "todos",
                FieldValue::List(vec![
                    FieldValue::Reference(StoreKey::new("Todo3")),
                    FieldValue::null(),
                ]),
            )]),
        );
        let json = store.to_json().unwrap();
        let back = NormalizedStore::from_json(&json).unwrap();
        assert_eq!(back, store);
    }

    #[test]
    fn snapshot_shape_is_key_to_record() {
        let mut store = NormalizedStore::new();
        store.merge(
            StoreKey::root_query(),
            record(&[("todo", FieldValue::Reference(StoreKey::new("Todo3")))]),
        );
        let value = serde_json::to_value(&store).unwrap();
        assert_eq!(value, json!({"ROOT_QUERY": {"todo": {"ref": "Todo3"}}}));
    }

    #[test]
    fn snapshot_rejects_empty_keys() {
        let err = NormalizedStore::from_json(r#"{"": {}}"#).unwrap_err();
        assert!(matches!(err, StoreError::InvalidSnapshot { .. }));

        let err = NormalizedStore::from_json(r#"{"A": {"b": {"ref": ""}}}"#).unwrap_err();
        assert!(matches!(err, StoreError::InvalidSnapshot { .. }));
    }

    #[test]
    fn snapshot_rejects_malformed_json() {
        let err = NormalizedStore::from_json("[1, 2]").unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
