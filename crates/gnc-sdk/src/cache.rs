use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use gnc_document::{Document, SelectionSet, Variables};
use gnc_mutation::{IntegrationReport, Integrator, MutationDirective};
use gnc_reader::{ReadError, ReadOutcome, StoreReader};
use gnc_store::{NormalizedStore, RecordStore, StorePatch};
use gnc_types::{IdentityResolver, JsonObject, StoreKey};
use gnc_writer::{StoreWriter, WriteReport};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::CacheConfig;
use crate::error::{CacheError, CacheResult};

/// Result of [`NormalizedCache::mutate`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MutationOutcome {
    /// The write of the mutation's own response.
    pub write: WriteReport,
    /// The directives applied afterwards.
    pub integration: IntegrationReport,
    /// Union of both patches.
    pub patch: StorePatch,
}

/// A normalized GraphQL cache.
///
/// Owns one [`NormalizedStore`] behind a lock. Each write, and each
/// write-then-integrate cycle of a mutation, holds the write lock from start
/// to finish, so readers never observe a half-applied response.
pub struct NormalizedCache {
    store: RwLock<NormalizedStore>,
    writer: StoreWriter,
    reader: StoreReader,
    integrator: Integrator,
    config: CacheConfig,
}

impl NormalizedCache {
    /// Create an empty cache using the identity strategy named in `config`.
    pub fn new(config: CacheConfig) -> CacheResult<Self> {
        config.validate()?;
        let resolver = config.identity.build_resolver();
        Ok(Self::build(config, resolver))
    }

    /// Create an empty cache with a caller-supplied identity resolver; the
    /// config's identity section is ignored.
    pub fn with_resolver(config: CacheConfig, resolver: Arc<dyn IdentityResolver>) -> Self {
        Self::build(config, resolver)
    }

    fn build(config: CacheConfig, resolver: Arc<dyn IdentityResolver>) -> Self {
        let possible_types = config.possible_types();
        Self {
            store: RwLock::new(NormalizedStore::new()),
            writer: StoreWriter::new(resolver, possible_types.clone()),
            reader: StoreReader::new(possible_types),
            integrator: Integrator::new(),
            config,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn read_lock(&self) -> CacheResult<RwLockReadGuard<'_, NormalizedStore>> {
        self.store
            .read()
            .map_err(|e| CacheError::LockPoisoned(e.to_string()))
    }

    fn write_lock(&self) -> CacheResult<RwLockWriteGuard<'_, NormalizedStore>> {
        self.store
            .write()
            .map_err(|e| CacheError::LockPoisoned(e.to_string()))
    }

    // ---- Writes ----

    /// Write a query (or subscription) response.
    pub fn write_query(
        &self,
        document: &Document,
        operation_name: Option<&str>,
        variables: &Variables,
        response: &Value,
    ) -> CacheResult<WriteReport> {
        let mut store = self.write_lock()?;
        let report = self.writer.write_operation(
            &mut *store,
            document,
            operation_name,
            variables,
            response,
        )?;
        Ok(report)
    }

    /// Write `object` onto the record at `key`, e.g. to update one entity
    /// with a fragment's data.
    pub fn write_at(
        &self,
        key: StoreKey,
        selection_set: &SelectionSet,
        document: &Document,
        variables: &Variables,
        object: &JsonObject,
    ) -> CacheResult<WriteReport> {
        let mut store = self.write_lock()?;
        let report = self.writer.write_selection_set(
            &mut *store,
            key,
            selection_set,
            document,
            variables,
            object,
        )?;
        Ok(report)
    }

    /// Write a mutation's response, then apply `directives` to the store.
    ///
    /// Directive failures are reported in the outcome, not returned as
    /// errors.
    pub fn mutate(
        &self,
        document: &Document,
        operation_name: Option<&str>,
        variables: &Variables,
        response: &Value,
        directives: &[MutationDirective],
    ) -> CacheResult<MutationOutcome> {
        let mut store = self.write_lock()?;
        let write = self.writer.write_operation(
            &mut *store,
            document,
            operation_name,
            variables,
            response,
        )?;
        let integration = self
            .integrator
            .integrate(&mut *store, directives, &write.locations);
        drop(store);

        let mut patch = write.patch.clone();
        patch.extend(integration.patch.clone());
        debug!(
            directives = directives.len(),
            failed = integration.failures.len(),
            changed = patch.changed.len(),
            "mutation integrated"
        );
        Ok(MutationOutcome {
            write,
            integration,
            patch,
        })
    }

    // ---- Reads ----

    /// Read a query from the store.
    ///
    /// With `return_partial_data` disabled an incomplete read is an error.
    pub fn read_query(
        &self,
        document: &Document,
        operation_name: Option<&str>,
        variables: &Variables,
    ) -> CacheResult<ReadOutcome> {
        let store = self.read_lock()?;
        let outcome = self
            .reader
            .read_operation(&*store, document, operation_name, variables)?;
        self.finish_read(outcome)
    }

    /// Read `selection_set` against the record at `key`.
    ///
    /// Honors `return_partial_data` the same way [`read_query`](Self::read_query) does.
    pub fn read_at(
        &self,
        key: &StoreKey,
        selection_set: &SelectionSet,
        document: &Document,
        variables: &Variables,
    ) -> CacheResult<ReadOutcome> {
        let store = self.read_lock()?;
        let outcome =
            self.reader
                .read_selection_set(&*store, key, selection_set, document, variables)?;
        self.finish_read(outcome)
    }

    fn finish_read(&self, outcome: ReadOutcome) -> CacheResult<ReadOutcome> {
        if !outcome.complete && !self.config.return_partial_data {
            return Err(ReadError::MissingData {
                paths: outcome.missing_paths(),
            }
            .into());
        }
        Ok(outcome)
    }

    // ---- Store management ----

    /// Drop every record.
    pub fn reset(&self) -> CacheResult<()> {
        let mut store = self.write_lock()?;
        let dropped = store.len();
        store.clear();
        info!(dropped, "cache reset");
        Ok(())
    }

    /// Copy of the whole store.
    pub fn extract(&self) -> CacheResult<NormalizedStore> {
        Ok(self.read_lock()?.clone())
    }

    pub fn extract_json(&self) -> CacheResult<String> {
        Ok(self.read_lock()?.to_json()?)
    }

    /// Replace the store's contents.
    pub fn restore(&self, snapshot: NormalizedStore) -> CacheResult<()> {
        snapshot.validate()?;
        let mut store = self.write_lock()?;
        *store = snapshot;
        debug!(records = store.len(), "cache restored");
        Ok(())
    }

    pub fn restore_json(&self, json: &str) -> CacheResult<()> {
        self.restore(NormalizedStore::from_json(json)?)
    }

    /// Number of records in the store.
    pub fn len(&self) -> CacheResult<usize> {
        Ok(self.read_lock()?.len())
    }

    pub fn is_empty(&self) -> CacheResult<bool> {
        Ok(self.read_lock()?.is_empty())
    }

    /// Records holding references to absent records, as `(holder, field, target)`.
    pub fn dangling_references(&self) -> CacheResult<Vec<gnc_store::DanglingReference>> {
        Ok(self.read_lock()?.dangling_references())
    }

    /// Keys of records that reference `key`.
    pub fn referrers(&self, key: &StoreKey) -> CacheResult<BTreeMap<StoreKey, Vec<String>>> {
        let store = self.read_lock()?;
        let mut out = BTreeMap::new();
        for holder in store.referrers(key) {
            let fields: Vec<String> = store
                .get(&holder)
                .map(|record| {
                    record
                        .iter()
                        .filter(|(_, value)| value.references().contains(&key))
                        .map(|(field, _)| field.clone())
                        .collect()
                })
                .unwrap_or_default();
            out.insert(holder, fields);
        }
        Ok(out)
    }
}

impl std::fmt::Debug for NormalizedCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NormalizedCache")
            .field("store", &self.store)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gnc_document::{ArgValue, Field, FragmentDefinition};
    use gnc_types::{MissingReason, ResponsePath, StorePath};
    use serde_json::json;

    fn cache() -> NormalizedCache {
        NormalizedCache::new(CacheConfig::default()).unwrap()
    }

    fn todo_fields() -> SelectionSet {
        SelectionSet::new()
            .field(Field::new("__typename"))
            .field(Field::new("id"))
            .field(Field::new("title"))
    }

    fn todo_list_query() -> Document {
        Document::query(
            SelectionSet::new().field(
                Field::new("todoList").arg("id", ArgValue::variable("id")).select(
                    SelectionSet::new()
                        .field(Field::new("__typename"))
                        .field(Field::new("id"))
                        .field(Field::new("todos").select(todo_fields())),
                ),
            ),
        )
    }

    fn vars() -> Variables {
        let mut vars = Variables::new();
        vars.insert("id".into(), json!(5));
        vars
    }

    fn todo_list_response() -> Value {
        json!({
            "todoList": {
                "__typename": "TodoList",
                "id": "5",
                "todos": [
                    {"__typename": "Todo", "id": "3", "title": "Buy milk"},
                    {"__typename": "Todo", "id": "6", "title": "Walk dog"},
                    {"__typename": "Todo", "id": "12", "title": "File taxes"}
                ]
            }
        })
    }

    fn seeded() -> NormalizedCache {
        let cache = cache();
        cache
            .write_query(&todo_list_query(), None, &vars(), &todo_list_response())
            .unwrap();
        cache
    }

    fn create_todo_mutation() -> Document {
        Document::mutation(SelectionSet::new().field(
            Field::new("createTodo").arg("title", "Call mom").select(todo_fields()),
        ))
    }

    fn create_todo_response() -> Value {
        json!({"createTodo": {"__typename": "Todo", "id": "99", "title": "Call mom"}})
    }

    fn todo_ids(cache: &NormalizedCache) -> Vec<String> {
        let outcome = cache.read_query(&todo_list_query(), None, &vars()).unwrap();
        outcome.data["todoList"]["todos"]
            .as_array()
            .map(|todos| {
                todos
                    .iter()
                    .filter_map(|todo| todo["id"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn insert(position: &str) -> MutationDirective {
        let path = ResponsePath::parse("createTodo").unwrap();
        match position {
            "front" => MutationDirective::insert_front(path, "TodoList5", "todos"),
            _ => MutationDirective::insert_back(path, "TodoList5", "todos"),
        }
    }

    // -----------------------------------------------------------------------
    // Write / read
    // -----------------------------------------------------------------------

    #[test]
    fn write_then_read_round_trips() {
        let cache = seeded();
        let outcome = cache.read_query(&todo_list_query(), None, &vars()).unwrap();
        assert!(outcome.complete);
        assert_eq!(outcome.data, todo_list_response());
    }

    #[test]
    fn second_write_with_subset_keeps_fields() {
        let cache = seeded();
        let doc = Document::query(SelectionSet::new().field(
            Field::new("todo").arg("id", 3).select(
                SelectionSet::new()
                    .field(Field::new("__typename"))
                    .field(Field::new("id"))
                    .field(Field::new("done")),
            ),
        ));
        cache
            .write_query(
                &doc,
                None,
                &Variables::new(),
                &json!({"todo": {"__typename": "Todo", "id": "3", "done": true}}),
            )
            .unwrap();

        let outcome = cache.read_query(&todo_list_query(), None, &vars()).unwrap();
        assert!(outcome.complete);
        assert_eq!(outcome.data["todoList"]["todos"][0]["title"], json!("Buy milk"));

        let full = Document::query(SelectionSet::new().field(
            Field::new("todo").arg("id", 3).select(
                SelectionSet::new().field(Field::new("title")).field(Field::new("done")),
            ),
        ));
        let outcome = cache.read_query(&full, None, &Variables::new()).unwrap();
        assert_eq!(outcome.data, json!({"todo": {"title": "Buy milk", "done": true}}));
    }

    #[test]
    fn objects_with_one_key_share_a_record() {
        let cache = seeded();
        let doc = Document::query(SelectionSet::new().field(
            Field::new("todo").arg("id", 6).select(todo_fields()),
        ));
        cache
            .write_query(
                &doc,
                None,
                &Variables::new(),
                &json!({"todo": {"__typename": "Todo", "id": "6", "title": "Walk cat"}}),
            )
            .unwrap();

        let outcome = cache.read_query(&todo_list_query(), None, &vars()).unwrap();
        assert_eq!(outcome.data["todoList"]["todos"][1]["title"], json!("Walk cat"));
        let store = cache.extract().unwrap();
        assert_eq!(store.referrers(&StoreKey::new("Todo6")).len(), 2);
    }

    #[test]
    fn read_of_unwritten_query_is_incomplete() {
        let outcome = cache()
            .read_query(&todo_list_query(), None, &vars())
            .unwrap();
        assert!(!outcome.complete);
    }

    #[test]
    fn strict_config_fails_incomplete_reads() {
        let config = CacheConfig {
            return_partial_data: false,
            ..CacheConfig::default()
        };
        let cache = NormalizedCache::new(config).unwrap();
        let err = cache
            .read_query(&todo_list_query(), None, &vars())
            .unwrap_err();
        assert!(matches!(err, CacheError::Read(ReadError::MissingData { .. })));
    }

    #[test]
    fn strict_config_fails_incomplete_reads_at_a_key() {
        let config = CacheConfig {
            return_partial_data: false,
            ..CacheConfig::default()
        };
        let cache = NormalizedCache::new(config).unwrap();
        let title = SelectionSet::new().field(Field::new("title"));
        let err = cache
            .read_at(&StoreKey::new("Todo3"), &title, &Document::default(), &Variables::new())
            .unwrap_err();
        match err {
            CacheError::Read(ReadError::MissingData { paths }) => {
                assert_eq!(paths, vec![ResponsePath::parse("title").unwrap()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn fragments_written_and_read_at_an_entity() {
        let cache = seeded();
        let doc = Document::default().with_fragment(FragmentDefinition::new(
            "Done",
            "Todo",
            SelectionSet::new().field(Field::new("done")),
        ));
        let fragment = SelectionSet::new().spread("Done");
        let object = json!({"__typename": "Todo", "done": true});
        cache
            .write_at(
                StoreKey::new("Todo12"),
                &fragment,
                &doc,
                &Variables::new(),
                object.as_object().unwrap(),
            )
            .unwrap();
        let outcome = cache
            .read_at(&StoreKey::new("Todo12"), &fragment, &doc, &Variables::new())
            .unwrap();
        assert_eq!(outcome.data, json!({"done": true}));
    }

    #[test]
    fn custom_resolver() {
        let resolver = |object: &JsonObject, _path: &StorePath| {
            object
                .get("id")
                .and_then(Value::as_str)
                .map(|id| StoreKey::new(format!("node:{id}")))
        };
        let cache = NormalizedCache::with_resolver(CacheConfig::default(), Arc::new(resolver));
        cache
            .write_query(&todo_list_query(), None, &vars(), &todo_list_response())
            .unwrap();
        let store = cache.extract().unwrap();
        assert!(store.contains(&StoreKey::new("node:5")));
        assert!(store.contains(&StoreKey::new("node:12")));
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    #[test]
    fn delete_makes_direct_reads_incomplete() {
        let cache = seeded();
        let doc = Document::query(SelectionSet::new().field(
            Field::new("todo").arg("id", 3).select(todo_fields()),
        ));
        cache
            .write_query(
                &doc,
                None,
                &Variables::new(),
                &json!({"todo": {"__typename": "Todo", "id": "3", "title": "Buy milk"}}),
            )
            .unwrap();

        let outcome = cache
            .mutate(
                &Document::mutation(SelectionSet::new().field(Field::new("deleteTodo").arg("id", 3))),
                None,
                &Variables::new(),
                &json!({"deleteTodo": true}),
                &[MutationDirective::delete("Todo3")],
            )
            .unwrap();
        assert!(outcome.patch.changed.contains(&StoreKey::new("Todo3")));

        let read = cache.read_query(&doc, None, &Variables::new()).unwrap();
        assert!(!read.complete);
        assert!(read.data.get("todo").is_none());
        assert!(matches!(
            read.missing[0].reason,
            MissingReason::DanglingReference { .. }
        ));
    }

    #[test]
    fn insert_front() {
        let cache = seeded();
        let outcome = cache
            .mutate(
                &create_todo_mutation(),
                None,
                &Variables::new(),
                &create_todo_response(),
                &[insert("front")],
            )
            .unwrap();
        assert!(outcome.integration.is_clean());
        assert_eq!(todo_ids(&cache), vec!["99", "3", "6", "12"]);
    }

    #[test]
    fn insert_back() {
        let cache = seeded();
        cache
            .mutate(
                &create_todo_mutation(),
                None,
                &Variables::new(),
                &create_todo_response(),
                &[insert("back")],
            )
            .unwrap();
        assert_eq!(todo_ids(&cache), vec!["3", "6", "12", "99"]);
    }

    #[test]
    fn insert_front_then_back() {
        let cache = seeded();
        cache
            .mutate(
                &create_todo_mutation(),
                None,
                &Variables::new(),
                &create_todo_response(),
                &[insert("front"), insert("back")],
            )
            .unwrap();
        assert_eq!(todo_ids(&cache), vec!["99", "3", "6", "12", "99"]);
    }

    #[test]
    fn deleted_list_element_is_dropped_on_read() {
        let cache = seeded();
        cache
            .mutate(
                &Document::mutation(SelectionSet::new().field(Field::new("deleteTodo").arg("id", 3))),
                None,
                &Variables::new(),
                &json!({"deleteTodo": true}),
                &[MutationDirective::delete("Todo3")],
            )
            .unwrap();

        let outcome = cache.read_query(&todo_list_query(), None, &vars()).unwrap();
        assert!(outcome.complete);
        assert_eq!(outcome.data["todoList"]["todos"].as_array().unwrap().len(), 2);
        assert_eq!(outcome.dropped.len(), 1);
        assert_eq!(cache.dangling_references().unwrap().len(), 1);
    }

    #[test]
    fn failed_directive_does_not_fail_the_mutation() {
        let cache = seeded();
        let outcome = cache
            .mutate(
                &create_todo_mutation(),
                None,
                &Variables::new(),
                &create_todo_response(),
                &[
                    MutationDirective::insert_back(
                        ResponsePath::parse("nope").unwrap(),
                        "TodoList5",
                        "todos",
                    ),
                    insert("back"),
                ],
            )
            .unwrap();
        assert_eq!(outcome.integration.applied, 1);
        assert_eq!(outcome.integration.failures[0].index, 0);
        assert_eq!(todo_ids(&cache), vec!["3", "6", "12", "99"]);
    }

    #[test]
    fn mutation_patch_unions_write_and_integration() {
        let cache = seeded();
        let outcome = cache
            .mutate(
                &create_todo_mutation(),
                None,
                &Variables::new(),
                &create_todo_response(),
                &[insert("front")],
            )
            .unwrap();
        assert!(outcome.patch.touched.contains(&StoreKey::root_mutation()));
        assert!(outcome.patch.touched.contains(&StoreKey::new("Todo99")));
        assert!(outcome.patch.changed.contains(&StoreKey::new("TodoList5")));
    }

    // -----------------------------------------------------------------------
    // Store management
    // -----------------------------------------------------------------------

    #[test]
    fn reset_clears_everything() {
        let cache = seeded();
        assert_eq!(cache.len().unwrap(), 5);
        cache.reset().unwrap();
        assert!(cache.is_empty().unwrap());
    }

    #[test]
    fn extract_and_restore() {
        let cache = seeded();
        let json = cache.extract_json().unwrap();

        let other = NormalizedCache::new(CacheConfig::default()).unwrap();
        other.restore_json(&json).unwrap();
        assert_eq!(other.extract().unwrap(), cache.extract().unwrap());
        let outcome = other.read_query(&todo_list_query(), None, &vars()).unwrap();
        assert_eq!(outcome.data, todo_list_response());

        let err = other.restore_json("not json").unwrap_err();
        assert!(matches!(err, CacheError::Store(_)));
    }

    #[test]
    fn referrers_name_fields() {
        let cache = seeded();
        let referrers = cache.referrers(&StoreKey::new("Todo3")).unwrap();
        assert_eq!(referrers.len(), 1);
        assert_eq!(referrers[&StoreKey::new("TodoList5")], vec!["todos".to_string()]);
    }
}
