//! Classified field contents.
//!
//! Every value the writer stores is classified exactly once, at write time,
//! into one of the [`FieldValue`] variants. Readers and mutation directives
//! only ever inspect the variant; they never re-infer shape from JSON.

use std::collections::btree_map::{self, Entry};
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::key::StoreKey;

/// The stored content of one field slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    /// A leaf value, stored verbatim (custom JSON scalars included).
    Scalar(Value),
    /// A pointer to another record.
    #[serde(rename = "ref")]
    Reference(StoreKey),
    /// An ordered list; elements are classified independently.
    List(Vec<FieldValue>),
    /// A nameless nested record with no identity of its own.
    Inline(FieldRecord),
}

impl FieldValue {
    pub fn null() -> Self {
        FieldValue::Scalar(Value::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Scalar(Value::Null))
    }

    pub fn as_reference(&self) -> Option<&StoreKey> {
        match self {
            FieldValue::Reference(key) => Some(key),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// All store keys referenced by this value, depth-first, in order.
    pub fn references(&self) -> Vec<&StoreKey> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a StoreKey>) {
        match self {
            FieldValue::Scalar(_) => {}
            FieldValue::Reference(key) => out.push(key),
            FieldValue::List(items) => {
                for item in items {
                    item.collect_references(out);
                }
            }
            FieldValue::Inline(record) => {
                for value in record.values() {
                    value.collect_references(out);
                }
            }
        }
    }
}

impl From<StoreKey> for FieldValue {
    fn from(key: StoreKey) -> Self {
        FieldValue::Reference(key)
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Scalar(value)
    }
}

// ---------------------------------------------------------------------------
// FieldRecord
// ---------------------------------------------------------------------------

/// Flat mapping from storage field name to [`FieldValue`].
///
/// Storage field names carry an argument suffix when the field was selected
/// with arguments, e.g. `todos({"status":"OPEN"})`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl FieldRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Replace a field outright, returning the previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.fields.insert(field.into(), value)
    }

    pub fn remove(&mut self, field: &str) -> Option<FieldValue> {
        self.fields.remove(field)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, FieldValue> {
        self.fields.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &FieldValue> {
        self.fields.values()
    }

    /// The stored `__typename`, if one was selected and written.
    pub fn typename(&self) -> Option<&str> {
        match self.fields.get("__typename") {
            Some(FieldValue::Scalar(Value::String(name))) => Some(name),
            _ => None,
        }
    }

    /// Merge a single field into this record.
    ///
    /// Incoming values overwrite existing ones, except that two inline
    /// records in the same slot merge recursively. Returns `true` if the
    /// record changed.
    pub fn merge_field(&mut self, field: impl Into<String>, incoming: FieldValue) -> bool {
        match self.fields.entry(field.into()) {
            Entry::Vacant(slot) => {
                slot.insert(incoming);
                true
            }
            Entry::Occupied(mut slot) => match (slot.get_mut(), incoming) {
                (FieldValue::Inline(current), FieldValue::Inline(next)) => current.merge(next),
                (current, next) => {
                    if *current == next {
                        false
                    } else {
                        *current = next;
                        true
                    }
                }
            },
        }
    }

    /// Field-level merge of `other` into `self`.
    ///
    /// Fields present in `other` overwrite; fields absent from `other` are
    /// retained. Returns `true` if anything changed.
    pub fn merge(&mut self, other: FieldRecord) -> bool {
        let mut changed = false;
        for (field, value) in other.fields {
            changed |= self.merge_field(field, value);
        }
        changed
    }
}

impl FromIterator<(String, FieldValue)> for FieldRecord {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for FieldRecord {
    type Item = (String, FieldValue);
    type IntoIter = btree_map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldRecord {
    type Item = (&'a String, &'a FieldValue);
    type IntoIter = btree_map::Iter<'a, String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
