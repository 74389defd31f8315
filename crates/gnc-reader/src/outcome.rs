use gnc_types::{MissingField, ResponsePath, StoreKey};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A list element skipped because its record is gone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedReference {
    /// Position of the element in the stored list.
    pub path: ResponsePath,
    pub key: StoreKey,
}

/// Result of reading a selection from the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReadOutcome {
    /// The reconstructed result, shaped like the response to the query.
    pub data: Value,
    /// `false` when any selected field could not be supplied.
    pub complete: bool,
    pub missing: Vec<MissingField>,
    /// Dangling list elements left out of `data`. These do not make a read
    /// incomplete.
    pub dropped: Vec<DroppedReference>,
}

impl ReadOutcome {
    pub fn missing_paths(&self) -> Vec<ResponsePath> {
        self.missing.iter().map(|m| m.path.clone()).collect()
    }
}
