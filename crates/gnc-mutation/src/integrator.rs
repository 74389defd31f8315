//! Directive application.
//!
//! The [`Integrator`] runs directives in order against the store. A failing
//! directive is logged and reported, then skipped; earlier directives stay
//! applied and later ones still run.

use std::collections::BTreeMap;

use gnc_store::{RecordStore, StorePatch};
use gnc_types::{FieldValue, ResponsePath, StoreKey};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::directive::{InsertPosition, MutationDirective};
use crate::error::{MutationError, MutationResult};

/// A directive that was skipped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectiveFailure {
    /// Position of the directive in the submitted list.
    pub index: usize,
    pub error: MutationError,
}

/// Outcome of one integration pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationReport {
    pub applied: usize,
    pub failures: Vec<DirectiveFailure>,
    pub patch: StorePatch,
}

impl IntegrationReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Applies [`MutationDirective`]s after a mutation's response was written.
#[derive(Clone, Copy, Debug, Default)]
pub struct Integrator;

impl Integrator {
    pub fn new() -> Self {
        Self
    }

    /// Apply `directives` in order.
    ///
    /// `locations` maps response paths of the mutation's own write to the
    /// keys they were stored under; insert directives resolve their result
    /// path through it.
    pub fn integrate(
        &self,
        store: &mut dyn RecordStore,
        directives: &[MutationDirective],
        locations: &BTreeMap<ResponsePath, StoreKey>,
    ) -> IntegrationReport {
        let mut report = IntegrationReport::default();
        for (index, directive) in directives.iter().enumerate() {
            match apply(store, directive, locations, &mut report.patch) {
                Ok(()) => report.applied += 1,
                Err(error) => {
                    warn!(index, kind = directive.kind_name(), %error, "skipping mutation directive");
                    report.failures.push(DirectiveFailure { index, error });
                }
            }
        }
        debug!(
            applied = report.applied,
            failed = report.failures.len(),
            changed = report.patch.changed.len(),
            "integration complete"
        );
        report
    }
}

fn apply(
    store: &mut dyn RecordStore,
    directive: &MutationDirective,
    locations: &BTreeMap<ResponsePath, StoreKey>,
    patch: &mut StorePatch,
) -> MutationResult<()> {
    match directive {
        MutationDirective::ArrayInsert {
            result_path,
            store_key,
            field,
            position,
        } => {
            let inserted = locations.get(result_path).cloned().ok_or_else(|| {
                MutationError::UnresolvableResultPath {
                    path: result_path.clone(),
                }
            })?;
            let mut items = current_list(store, store_key, field)?;
            let reference = FieldValue::Reference(inserted);
            match position {
                InsertPosition::Front => items.insert(0, reference),
                InsertPosition::Back => items.push(reference),
            }
            let changed = store.set_field(store_key, field, FieldValue::List(items));
            patch.record(store_key.clone(), changed);
        }
        MutationDirective::Delete { store_key } => {
            if store.remove(store_key).is_some() {
                patch.record(store_key.clone(), true);
            } else {
                debug!(key = %store_key, "delete of absent record");
            }
        }
        MutationDirective::ArrayDelete {
            store_key,
            field,
            target,
        } => {
            let mut items = current_list(store, store_key, field)?;
            let before = items.len();
            items.retain(|item| item.as_reference() != Some(target));
            if items.len() != before {
                let changed = store.set_field(store_key, field, FieldValue::List(items));
                patch.record(store_key.clone(), changed);
            }
        }
    }
    Ok(())
}

/// The list stored at `key.field`; an absent field or `null` reads as empty.
fn current_list(
    store: &dyn RecordStore,
    key: &StoreKey,
    field: &str,
) -> MutationResult<Vec<FieldValue>> {
    match store.get_field(key, field) {
        None => Ok(Vec::new()),
        Some(value) if value.is_null() => Ok(Vec::new()),
        Some(FieldValue::List(items)) => Ok(items.clone()),
        Some(_) => Err(MutationError::TargetNotList {
            key: key.clone(),
            field: field.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gnc_store::NormalizedStore;
    use gnc_types::FieldRecord;
    use serde_json::json;

    fn reference(key: &str) -> FieldValue {
        FieldValue::Reference(StoreKey::new(key))
    }

    fn todo_list_key() -> StoreKey {
        StoreKey::new("TodoList5")
    }

    fn seeded_store() -> NormalizedStore {
        let mut store = NormalizedStore::new();
        let mut list = FieldRecord::new();
        list.insert(
            "todos",
            FieldValue::List(vec![reference("Todo3"), reference("Todo6"), reference("Todo12")]),
        );
        list.insert("title", FieldValue::Scalar(json!("chores")));
        store.merge(todo_list_key(), list);
        for id in ["Todo3", "Todo6", "Todo12", "Todo99"] {
            let mut todo = FieldRecord::new();
            todo.insert("id", FieldValue::Scalar(json!(id)));
            store.merge(StoreKey::new(id), todo);
        }
        store
    }

    fn created_at(path: &str, key: &str) -> BTreeMap<ResponsePath, StoreKey> {
        let mut locations = BTreeMap::new();
        locations.insert(ResponsePath::parse(path).unwrap(), StoreKey::new(key));
        locations
    }

    fn todos(store: &NormalizedStore) -> Vec<FieldValue> {
        store
            .get_field(&todo_list_key(), "todos")
            .and_then(FieldValue::as_list)
            .map(<[FieldValue]>::to_vec)
            .unwrap_or_default()
    }

    fn create_path() -> ResponsePath {
        ResponsePath::parse("createTodo").unwrap()
    }

    // -----------------------------------------------------------------------
    // Inserts
    // -----------------------------------------------------------------------

    #[test]
    fn insert_front() {
        let mut store = seeded_store();
        let report = Integrator::new().integrate(
            &mut store,
            &[MutationDirective::insert_front(create_path(), "TodoList5", "todos")],
            &created_at("createTodo", "Todo99"),
        );
        assert_eq!(report.applied, 1);
        assert!(report.is_clean());
        assert!(report.patch.changed.contains(&todo_list_key()));
        assert_eq!(
            todos(&store),
            vec![reference("Todo99"), reference("Todo3"), reference("Todo6"), reference("Todo12")]
        );
    }

    #[test]
    fn insert_back() {
        let mut store = seeded_store();
        Integrator::new().integrate(
            &mut store,
            &[MutationDirective::insert_back(create_path(), "TodoList5", "todos")],
            &created_at("createTodo", "Todo99"),
        );
        assert_eq!(
            todos(&store),
            vec![reference("Todo3"), reference("Todo6"), reference("Todo12"), reference("Todo99")]
        );
    }

    #[test]
    fn inserts_apply_cumulatively() {
        let mut store = seeded_store();
        let report = Integrator::new().integrate(
            &mut store,
            &[
                MutationDirective::insert_front(create_path(), "TodoList5", "todos"),
                MutationDirective::insert_back(create_path(), "TodoList5", "todos"),
            ],
            &created_at("createTodo", "Todo99"),
        );
        assert_eq!(report.applied, 2);
        assert_eq!(
            todos(&store),
            vec![
                reference("Todo99"),
                reference("Todo3"),
                reference("Todo6"),
                reference("Todo12"),
                reference("Todo99"),
            ]
        );
    }

    #[test]
    fn insert_leaves_other_fields_alone() {
        let mut store = seeded_store();
        Integrator::new().integrate(
            &mut store,
            &[MutationDirective::insert_back(create_path(), "TodoList5", "todos")],
            &created_at("createTodo", "Todo99"),
        );
        assert_eq!(
            store.get_field(&todo_list_key(), "title"),
            Some(&FieldValue::Scalar(json!("chores")))
        );
    }

    #[test]
    fn insert_into_absent_list_or_record() {
        let mut store = seeded_store();
        let report = Integrator::new().integrate(
            &mut store,
            &[
                MutationDirective::insert_back(create_path(), "TodoList5", "archived"),
                MutationDirective::insert_back(create_path(), "TodoList8", "todos"),
            ],
            &created_at("createTodo", "Todo99"),
        );
        assert_eq!(report.applied, 2);
        assert_eq!(
            store.get_field(&todo_list_key(), "archived"),
            Some(&FieldValue::List(vec![reference("Todo99")]))
        );
        assert_eq!(
            store.get_field(&StoreKey::new("TodoList8"), "todos"),
            Some(&FieldValue::List(vec![reference("Todo99")]))
        );
    }

    #[test]
    fn insert_into_null_list() {
        let mut store = seeded_store();
        store.set_field(&todo_list_key(), "todos", FieldValue::null());
        Integrator::new().integrate(
            &mut store,
            &[MutationDirective::insert_front(create_path(), "TodoList5", "todos")],
            &created_at("createTodo", "Todo99"),
        );
        assert_eq!(todos(&store), vec![reference("Todo99")]);
    }

    // -----------------------------------------------------------------------
    // Failures
    // -----------------------------------------------------------------------

    #[test]
    fn unresolvable_path_is_skipped_and_others_apply() {
        let mut store = seeded_store();
        let report = Integrator::new().integrate(
            &mut store,
            &[
                MutationDirective::insert_front(create_path(), "TodoList5", "todos"),
                MutationDirective::insert_front(
                    ResponsePath::parse("createTodo.owner").unwrap(),
                    "TodoList5",
                    "todos",
                ),
                MutationDirective::delete("Todo12"),
            ],
            &created_at("createTodo", "Todo99"),
        );
        assert_eq!(report.applied, 2);
        assert_eq!(
            report.failures,
            vec![DirectiveFailure {
                index: 1,
                error: MutationError::UnresolvableResultPath {
                    path: ResponsePath::parse("createTodo.owner").unwrap()
                },
            }]
        );
        assert_eq!(todos(&store)[0], reference("Todo99"));
        assert!(!store.contains(&StoreKey::new("Todo12")));
    }

    #[test]
    fn non_list_target_fails() {
        let mut store = seeded_store();
        let report = Integrator::new().integrate(
            &mut store,
            &[MutationDirective::insert_back(create_path(), "TodoList5", "title")],
            &created_at("createTodo", "Todo99"),
        );
        assert_eq!(report.applied, 0);
        assert!(matches!(
            report.failures[0].error,
            MutationError::TargetNotList { .. }
        ));
        assert_eq!(
            store.get_field(&todo_list_key(), "title"),
            Some(&FieldValue::Scalar(json!("chores")))
        );
    }

    // -----------------------------------------------------------------------
    // Deletes
    // -----------------------------------------------------------------------

    #[test]
    fn delete_removes_record_but_not_references() {
        let mut store = seeded_store();
        let report = Integrator::new().integrate(
            &mut store,
            &[MutationDirective::delete("Todo3")],
            &BTreeMap::new(),
        );
        assert_eq!(report.applied, 1);
        assert!(report.patch.changed.contains(&StoreKey::new("Todo3")));
        assert!(!store.contains(&StoreKey::new("Todo3")));
        assert_eq!(todos(&store).len(), 3);
    }

    #[test]
    fn delete_of_absent_key_is_a_no_op() {
        let mut store = seeded_store();
        let report = Integrator::new().integrate(
            &mut store,
            &[MutationDirective::delete("Todo404")],
            &BTreeMap::new(),
        );
        assert_eq!(report.applied, 1);
        assert!(report.patch.is_empty());
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn array_delete_strips_every_occurrence() {
        let mut store = seeded_store();
        let report = Integrator::new().integrate(
            &mut store,
            &[
                MutationDirective::insert_back(create_path(), "TodoList5", "todos"),
                MutationDirective::array_delete("TodoList5", "todos", "Todo3"),
                MutationDirective::array_delete("TodoList5", "todos", "Todo404"),
            ],
            &created_at("createTodo", "Todo3"),
        );
        assert_eq!(report.applied, 3);
        assert_eq!(todos(&store), vec![reference("Todo6"), reference("Todo12")]);
    }
}
