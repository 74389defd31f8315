use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("store key must not be empty")]
    EmptyKey,

    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },
}
