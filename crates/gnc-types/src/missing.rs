use std::fmt;

use serde::{Deserialize, Serialize};

use crate::key::StoreKey;
use crate::path::ResponsePath;

/// Why a selected field could not be written or read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum MissingReason {
    /// The response (or the store) has no value for the field.
    Absent,
    /// A value exists but has the wrong shape for the selection.
    TypeMismatch { expected: String, found: String },
    /// The field holds a reference to a record that is not in the store.
    DanglingReference { key: StoreKey },
}

/// A hole in a write or read, addressed by response path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingField {
    pub path: ResponsePath,
    #[serde(flatten)]
    pub reason: MissingReason,
}

impl MissingField {
    pub fn absent(path: ResponsePath) -> Self {
        Self {
            path,
            reason: MissingReason::Absent,
        }
    }

    pub fn type_mismatch(
        path: ResponsePath,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self {
            path,
            reason: MissingReason::TypeMismatch {
                expected: expected.into(),
                found: found.into(),
            },
        }
    }

    pub fn dangling(path: ResponsePath, key: StoreKey) -> Self {
        Self {
            path,
            reason: MissingReason::DanglingReference { key },
        }
    }
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            MissingReason::Absent => write!(f, "{}: absent", self.path),
            MissingReason::TypeMismatch { expected, found } => {
                write!(f, "{}: expected {expected}, found {found}", self.path)
            }
            MissingReason::DanglingReference { key } => {
                write!(f, "{}: dangling reference to {key}", self.path)
            }
        }
    }
}

/// Short JSON type name used in mismatch reports.
pub fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "list",
        serde_json::Value::Object(_) => "object",
    }
}
