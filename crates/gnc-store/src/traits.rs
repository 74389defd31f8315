use gnc_types::{FieldRecord, FieldValue, StoreKey};

/// Mutable mapping from [`StoreKey`] to [`FieldRecord`].
///
/// All implementations must satisfy these invariants:
/// - Writing a record that already exists is a field-level merge: incoming
///   fields overwrite, fields the incoming record lacks are kept.
/// - References are stored as keys, never followed or validated on write.
///   A reference to an absent key is legal and is resolved at read time.
/// - Removing a record does not touch records that refer to it.
///
/// The store has a single owner; callers serialize access.
pub trait RecordStore {
    /// Look up a record.
    fn get(&self, key: &StoreKey) -> Option<&FieldRecord>;

    /// Merge `record` into the record at `key`, creating it if absent.
    ///
    /// Returns `true` if the store changed.
    fn merge(&mut self, key: StoreKey, record: FieldRecord) -> bool;

    /// Set one field on the record at `key`, creating the record if absent.
    ///
    /// Returns `true` if the store changed.
    fn set_field(&mut self, key: &StoreKey, field: &str, value: FieldValue) -> bool;

    /// Remove a record entirely, returning it if it existed.
    fn remove(&mut self, key: &StoreKey) -> Option<FieldRecord>;

    /// All keys, in ascending order.
    fn keys(&self) -> Vec<StoreKey>;

    /// Number of records.
    fn len(&self) -> usize;

    /// Drop every record.
    fn clear(&mut self);

    fn contains(&self, key: &StoreKey) -> bool {
        self.get(key).is_some()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a single field of a record.
    fn get_field(&self, key: &StoreKey, field: &str) -> Option<&FieldValue> {
        self.get(key).and_then(|record| record.get(field))
    }
}
