use gnc_types::{ResponsePath, StoreKey};
use serde::{Deserialize, Serialize};

/// Where an inserted reference goes in the target list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertPosition {
    Front,
    Back,
}

/// A store edit declared alongside a mutation.
///
/// Directives are applied once, in declaration order, right after the
/// mutation's own response has been written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MutationDirective {
    /// Insert the object at `result_path` in the mutation response into the
    /// list at `store_key.field`.
    ArrayInsert {
        result_path: ResponsePath,
        store_key: StoreKey,
        field: String,
        position: InsertPosition,
    },
    /// Remove the record at `store_key`. Referrers are left as they are.
    Delete { store_key: StoreKey },
    /// Remove every reference to `target` from the list at `store_key.field`.
    ArrayDelete {
        store_key: StoreKey,
        field: String,
        target: StoreKey,
    },
}

impl MutationDirective {
    pub fn insert_front(
        result_path: ResponsePath,
        store_key: impl Into<StoreKey>,
        field: impl Into<String>,
    ) -> Self {
        MutationDirective::ArrayInsert {
            result_path,
            store_key: store_key.into(),
            field: field.into(),
            position: InsertPosition::Front,
        }
    }

    pub fn insert_back(
        result_path: ResponsePath,
        store_key: impl Into<StoreKey>,
        field: impl Into<String>,
    ) -> Self {
        MutationDirective::ArrayInsert {
            result_path,
            store_key: store_key.into(),
            field: field.into(),
            position: InsertPosition::Back,
        }
    }

    pub fn delete(store_key: impl Into<StoreKey>) -> Self {
        MutationDirective::Delete {
            store_key: store_key.into(),
        }
    }

    pub fn array_delete(
        store_key: impl Into<StoreKey>,
        field: impl Into<String>,
        target: impl Into<StoreKey>,
    ) -> Self {
        MutationDirective::ArrayDelete {
            store_key: store_key.into(),
            field: field.into(),
            target: target.into(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            MutationDirective::ArrayInsert { .. } => "array_insert",
            MutationDirective::Delete { .. } => "delete",
            MutationDirective::ArrayDelete { .. } => "array_delete",
        }
    }
}
