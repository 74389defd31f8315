//! Reference integrity checks.
//!
//! Deletion never rewrites referrers, so a store may legitimately hold
//! references to absent records. These helpers find them.

use gnc_types::StoreKey;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::traits::RecordStore;

/// A reference from `holder.field` to a record that does not exist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DanglingReference {
    pub holder: StoreKey,
    pub field: String,
    pub target: StoreKey,
}

/// Every reference in `store` whose target is absent, in key and field order.
pub fn dangling_references<S: RecordStore + ?Sized>(store: &S) -> Vec<DanglingReference> {
    let mut dangling = Vec::new();
    for holder in store.keys() {
        let Some(record) = store.get(&holder) else {
            continue;
        };
        for (field, value) in record {
            for target in value.references() {
                if !store.contains(target) {
                    dangling.push(DanglingReference {
                        holder: holder.clone(),
                        field: field.clone(),
                        target: target.clone(),
                    });
                }
            }
        }
    }
    debug!(count = dangling.len(), "scanned for dangling references");
    dangling
}

/// Keys of records that reference `key` anywhere in their fields.
pub fn referrers<S: RecordStore + ?Sized>(store: &S, key: &StoreKey) -> Vec<StoreKey> {
    store
        .keys()
        .into_iter()
        .filter(|holder| {
            store.get(holder).is_some_and(|record| {
                record
                    .values()
                    .any(|value| value.references().contains(&key))
            })
        })
        .collect()
}
