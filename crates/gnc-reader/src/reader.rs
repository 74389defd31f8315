//! Result reconstruction.
//!
//! [`StoreReader`] walks a selection set starting at a root record and
//! rebuilds the nested result by following references. Reads never mutate
//! the store, so reading twice against the same store gives the same result.

use gnc_document::{Document, Field, PossibleTypes, SelectionSet, Variables};
use gnc_store::RecordStore;
use gnc_types::{
    json_type_name, FieldRecord, FieldValue, JsonObject, MissingField, ResponsePath, StoreKey,
};
use serde_json::Value;
use tracing::debug;

use crate::error::{ReadError, ReadResult};
use crate::outcome::{DroppedReference, ReadOutcome};

/// Reads query results out of a [`RecordStore`].
#[derive(Clone, Debug, Default)]
pub struct StoreReader {
    possible_types: PossibleTypes,
}

impl StoreReader {
    pub fn new(possible_types: PossibleTypes) -> Self {
        Self { possible_types }
    }

    /// Read one operation of `document`, starting at its root record.
    pub fn read_operation(
        &self,
        store: &dyn RecordStore,
        document: &Document,
        operation_name: Option<&str>,
        variables: &Variables,
    ) -> ReadResult<ReadOutcome> {
        let operation = document.operation(operation_name)?;
        let variables = operation.effective_variables(variables);
        self.read_selection_set(
            store,
            &operation.root_key(),
            &operation.selection_set,
            document,
            &variables,
        )
    }

    /// Read `selection_set` against the record at `root`.
    ///
    /// An absent root record reads as an empty one.
    pub fn read_selection_set(
        &self,
        store: &dyn RecordStore,
        root: &StoreKey,
        selection_set: &SelectionSet,
        document: &Document,
        variables: &Variables,
    ) -> ReadResult<ReadOutcome> {
        let empty = FieldRecord::new();
        let record = store.get(root).unwrap_or(&empty);
        let mut pass = ReadPass {
            reader: self,
            store,
            document,
            variables,
            missing: Vec::new(),
            dropped: Vec::new(),
        };
        let data = pass.read_record(selection_set, record, &ResponsePath::root())?;

        debug!(
            root = %root,
            missing = pass.missing.len(),
            dropped = pass.dropped.len(),
            "read complete"
        );

        Ok(ReadOutcome {
            data: Value::Object(data),
            complete: pass.missing.is_empty(),
            missing: pass.missing,
            dropped: pass.dropped,
        })
    }

    /// Like [`read_operation`](Self::read_operation), but incomplete data is
    /// an error.
    pub fn read_strict(
        &self,
        store: &dyn RecordStore,
        document: &Document,
        operation_name: Option<&str>,
        variables: &Variables,
    ) -> ReadResult<Value> {
        let outcome = self.read_operation(store, document, operation_name, variables)?;
        if outcome.complete {
            Ok(outcome.data)
        } else {
            Err(ReadError::MissingData {
                paths: outcome.missing_paths(),
            })
        }
    }
}

/// What a stored value resolved to.
enum Resolved {
    Value(Value),
    /// A dangling list element; left out of the list.
    Dropped,
    /// The field cannot be supplied; already recorded as missing.
    Missing,
}

struct ReadPass<'a> {
    reader: &'a StoreReader,
    store: &'a dyn RecordStore,
    document: &'a Document,
    variables: &'a Variables,
    missing: Vec<MissingField>,
    dropped: Vec<DroppedReference>,
}

impl ReadPass<'_> {
    fn note_missing(&mut self, missing: MissingField) {
        if !self.missing.contains(&missing) {
            self.missing.push(missing);
        }
    }

    fn read_record(
        &mut self,
        selection_set: &SelectionSet,
        record: &FieldRecord,
        response_path: &ResponsePath,
    ) -> ReadResult<JsonObject> {
        let fields = self.document.collect_fields(
            selection_set,
            record.typename(),
            &self.reader.possible_types,
            self.variables,
        )?;

        let mut out = JsonObject::new();
        for collected in fields {
            let field = collected.field;
            let response_key = field.response_key();
            let path = response_path.child_field(response_key);
            let Some(stored) = record.get(&field.storage_name(self.variables)) else {
                if !collected.heuristic {
                    self.note_missing(MissingField::absent(path));
                }
                continue;
            };
            if let Resolved::Value(value) = self.read_field(field, stored, &path)? {
                match out.get_mut(response_key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        out.insert(response_key.to_string(), value);
                    }
                }
            }
        }
        Ok(out)
    }

    fn read_field(
        &mut self,
        field: &Field,
        stored: &FieldValue,
        path: &ResponsePath,
    ) -> ReadResult<Resolved> {
        match (&field.selection_set, stored) {
            (None, FieldValue::Scalar(value)) => Ok(Resolved::Value(value.clone())),
            (None, other) => {
                self.note_missing(MissingField::type_mismatch(
                    path.clone(),
                    "scalar",
                    stored_kind(other),
                ));
                Ok(Resolved::Missing)
            }
            (Some(selection_set), stored) => self.read_composite(selection_set, stored, path, false),
        }
    }

    fn read_composite(
        &mut self,
        selection_set: &SelectionSet,
        stored: &FieldValue,
        path: &ResponsePath,
        in_list: bool,
    ) -> ReadResult<Resolved> {
        match stored {
            FieldValue::Scalar(Value::Null) => Ok(Resolved::Value(Value::Null)),
            FieldValue::Scalar(other) => {
                self.note_missing(MissingField::type_mismatch(
                    path.clone(),
                    "object",
                    json_type_name(other),
                ));
                Ok(Resolved::Missing)
            }
            FieldValue::Reference(key) => match self.store.get(key) {
                Some(record) => {
                    let object = self.read_record(selection_set, record, path)?;
                    Ok(Resolved::Value(Value::Object(object)))
                }
                None if in_list => {
                    self.dropped.push(DroppedReference {
                        path: path.clone(),
                        key: key.clone(),
                    });
                    Ok(Resolved::Dropped)
                }
                None => {
                    self.note_missing(MissingField::dangling(path.clone(), key.clone()));
                    Ok(Resolved::Missing)
                }
            },
            FieldValue::Inline(record) => {
                let object = self.read_record(selection_set, record, path)?;
                Ok(Resolved::Value(Value::Object(object)))
            }
            FieldValue::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let element =
                        self.read_composite(selection_set, item, &path.child_index(index), true)?;
                    match element {
                        Resolved::Value(value) => out.push(value),
                        Resolved::Dropped => {}
                        Resolved::Missing => return Ok(Resolved::Missing),
                    }
                }
                Ok(Resolved::Value(Value::Array(out)))
            }
        }
    }
}

fn stored_kind(value: &FieldValue) -> &'static str {
    match value {
        FieldValue::Scalar(v) => json_type_name(v),
        FieldValue::Reference(_) => "reference",
        FieldValue::List(_) => "list",
        FieldValue::Inline(_) => "inline record",
    }
}

/// Merge two results for the same response key (a field selected twice
/// with different sub-selections).
fn merge_json(target: &mut Value, incoming: Value) {
    match (target, incoming) {
        (Value::Object(existing), Value::Object(next)) => {
            for (key, value) in next {
                match existing.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        existing.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(existing), Value::Array(next)) if existing.len() == next.len() => {
            for (slot, value) in existing.iter_mut().zip(next) {
                merge_json(slot, value);
            }
        }
        (slot, next) => *slot = next,
    }
}
