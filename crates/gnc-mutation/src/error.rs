use gnc_types::{ResponsePath, StoreKey};
use serde::{Deserialize, Serialize};

/// Why a single directive could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum MutationError {
    /// The result path does not name an object the mutation's own write
    /// stored as a reference.
    #[error("unresolvable result path: {path}")]
    UnresolvableResultPath { path: ResponsePath },

    /// The target field holds something other than a list.
    #[error("{key}.{field} is not a list")]
    TargetNotList { key: StoreKey, field: String },
}

/// Result alias for directive application.
pub type MutationResult<T> = Result<T, MutationError>;
