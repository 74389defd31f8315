use std::collections::BTreeSet;

use gnc_types::StoreKey;
use serde::{Deserialize, Serialize};

/// Keys affected by a write or an integration pass.
///
/// `touched` holds every key written to; `changed` the subset whose record
/// actually differs afterwards (including removed records). Observers only
/// need to re-read queries that depend on a `changed` key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorePatch {
    pub touched: BTreeSet<StoreKey>,
    pub changed: BTreeSet<StoreKey>,
}

impl StorePatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Note a write to `key`.
    pub fn record(&mut self, key: StoreKey, changed: bool) {
        if changed {
            self.changed.insert(key.clone());
        }
        self.touched.insert(key);
    }

    /// Fold another patch into this one.
    pub fn extend(&mut self, other: StorePatch) {
        self.touched.extend(other.touched);
        self.changed.extend(other.changed);
    }

    pub fn is_empty(&self) -> bool {
        self.touched.is_empty()
    }

    pub fn has_changes(&self) -> bool {
        !self.changed.is_empty()
    }
}
