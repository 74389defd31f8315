//! Response normalization.
//!
//! [`StoreWriter`] walks a selection set in lock-step with a JSON response.
//! Every object is offered to the identity resolver: a key turns the object
//! into its own record and the parent slot into a reference; no key keeps a
//! singular object inline and gives a list element a path-derived key.
//!
//! Records are assembled in a staging map and merged into the store only
//! once the whole traversal has succeeded.

use std::collections::BTreeMap;
use std::sync::Arc;

use gnc_document::{Document, Field, PossibleTypes, SelectionSet, Variables};
use gnc_store::{RecordStore, StorePatch};
use gnc_types::{
    json_type_name, FieldRecord, FieldValue, IdentityResolver, JsonObject, MissingField,
    ResponsePath, StoreKey, StorePath,
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{WriteError, WriteResult};
use crate::report::WriteReport;

/// Normalizes responses into a [`RecordStore`].
#[derive(Clone)]
pub struct StoreWriter {
    resolver: Arc<dyn IdentityResolver>,
    possible_types: PossibleTypes,
}

impl StoreWriter {
    pub fn new(resolver: Arc<dyn IdentityResolver>, possible_types: PossibleTypes) -> Self {
        Self {
            resolver,
            possible_types,
        }
    }

    pub fn possible_types(&self) -> &PossibleTypes {
        &self.possible_types
    }

    /// Write the response to one operation of `document`.
    ///
    /// `response` is the `data` member of a GraphQL response. The operation's
    /// root record (`ROOT_QUERY`, `ROOT_MUTATION`, …) receives the top-level
    /// fields.
    pub fn write_operation(
        &self,
        store: &mut dyn RecordStore,
        document: &Document,
        operation_name: Option<&str>,
        variables: &Variables,
        response: &Value,
    ) -> WriteResult<WriteReport> {
        let operation = document.operation(operation_name)?;
        let variables = operation.effective_variables(variables);
        let object = response
            .as_object()
            .ok_or_else(|| WriteError::ResponseNotObject {
                found: json_type_name(response).to_string(),
            })?;
        self.write_selection_set(
            store,
            operation.root_key(),
            &operation.selection_set,
            document,
            &variables,
            object,
        )
    }

    /// Write `object` into the record at `root` using `selection_set`.
    ///
    /// Used for operations and for writing a fragment directly onto an
    /// existing entity.
    pub fn write_selection_set(
        &self,
        store: &mut dyn RecordStore,
        root: StoreKey,
        selection_set: &SelectionSet,
        document: &Document,
        variables: &Variables,
        object: &JsonObject,
    ) -> WriteResult<WriteReport> {
        let mut pass = WritePass {
            writer: self,
            document,
            variables,
            staged: BTreeMap::new(),
            missing: Vec::new(),
            locations: BTreeMap::new(),
        };
        let record = pass.write_object(
            selection_set,
            object,
            &StorePath::new(root.clone()),
            &ResponsePath::root(),
        )?;
        pass.stage(root.clone(), record);

        let mut patch = StorePatch::new();
        for (key, record) in pass.staged {
            let changed = store.merge(key.clone(), record);
            patch.record(key, changed);
        }

        debug!(
            root = %root,
            touched = patch.touched.len(),
            changed = patch.changed.len(),
            missing = pass.missing.len(),
            "write complete"
        );

        Ok(WriteReport {
            patch,
            missing: pass.missing,
            locations: pass.locations,
        })
    }
}

impl std::fmt::Debug for StoreWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreWriter")
            .field("possible_types", &self.possible_types)
            .finish_non_exhaustive()
    }
}

/// State of one write traversal.
struct WritePass<'a> {
    writer: &'a StoreWriter,
    document: &'a Document,
    variables: &'a Variables,
    staged: BTreeMap<StoreKey, FieldRecord>,
    missing: Vec<MissingField>,
    locations: BTreeMap<ResponsePath, StoreKey>,
}

impl WritePass<'_> {
    fn stage(&mut self, key: StoreKey, record: FieldRecord) {
        self.staged.entry(key).or_default().merge(record);
    }

    fn note_missing(&mut self, missing: MissingField) {
        if !self.missing.contains(&missing) {
            self.missing.push(missing);
        }
    }

    /// Build the record for `object`; nested entities are staged on the way.
    fn write_object(
        &mut self,
        selection_set: &SelectionSet,
        object: &JsonObject,
        store_path: &StorePath,
        response_path: &ResponsePath,
    ) -> WriteResult<FieldRecord> {
        let typename = object.get("__typename").and_then(Value::as_str);
        let fields = self.document.collect_fields(
            selection_set,
            typename,
            &self.writer.possible_types,
            self.variables,
        )?;

        let mut record = FieldRecord::new();
        for collected in fields {
            let field = collected.field;
            let path = response_path.child_field(field.response_key());
            let Some(value) = object.get(field.response_key()) else {
                // Fields of a fragment whose type could not be checked may
                // legitimately be absent.
                if !collected.heuristic {
                    self.note_missing(MissingField::absent(path));
                }
                continue;
            };
            let storage_name = field.storage_name(self.variables);
            let child_store_path = store_path.field(&storage_name);
            if let Some(written) = self.write_field(field, value, &child_store_path, &path)? {
                record.merge_field(storage_name, written);
            }
        }
        Ok(record)
    }

    /// Value to store for `field`, or `None` when the subtree was rejected.
    fn write_field(
        &mut self,
        field: &Field,
        value: &Value,
        store_path: &StorePath,
        response_path: &ResponsePath,
    ) -> WriteResult<Option<FieldValue>> {
        match &field.selection_set {
            // Leaf fields are stored verbatim, including list and object
            // values of custom scalars.
            None => Ok(Some(FieldValue::Scalar(value.clone()))),
            Some(selection_set) => {
                self.write_composite(selection_set, value, store_path, response_path, false)
            }
        }
    }

    fn write_composite(
        &mut self,
        selection_set: &SelectionSet,
        value: &Value,
        store_path: &StorePath,
        response_path: &ResponsePath,
        in_list: bool,
    ) -> WriteResult<Option<FieldValue>> {
        match value {
            Value::Null => Ok(Some(FieldValue::null())),
            Value::Array(items) => {
                let mut written = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let element = self.write_composite(
                        selection_set,
                        item,
                        &store_path.index(index),
                        &response_path.child_index(index),
                        true,
                    )?;
                    match element {
                        Some(element) => written.push(element),
                        None => return Ok(None),
                    }
                }
                Ok(Some(FieldValue::List(written)))
            }
            Value::Object(object) => self
                .write_entity(selection_set, object, store_path, response_path, in_list)
                .map(Some),
            scalar => {
                let found = json_type_name(scalar);
                warn!(path = %response_path, found, "expected object in response");
                self.note_missing(MissingField::type_mismatch(
                    response_path.clone(),
                    "object",
                    found,
                ));
                Ok(None)
            }
        }
    }

    fn write_entity(
        &mut self,
        selection_set: &SelectionSet,
        object: &JsonObject,
        store_path: &StorePath,
        response_path: &ResponsePath,
        in_list: bool,
    ) -> WriteResult<FieldValue> {
        let key = match self.writer.resolver.resolve(object, store_path) {
            Some(key) => Some(key),
            None if in_list => Some(store_path.to_key()),
            None => None,
        };

        match key {
            Some(key) => {
                let record = self.write_object(
                    selection_set,
                    object,
                    &StorePath::new(key.clone()),
                    response_path,
                )?;
                self.stage(key.clone(), record);
                self.locations.insert(response_path.clone(), key.clone());
                Ok(FieldValue::Reference(key))
            }
            None => {
                let record = self.write_object(selection_set, object, store_path, response_path)?;
                Ok(FieldValue::Inline(record))
            }
        }
    }
}
