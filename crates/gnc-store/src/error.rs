use gnc_types::StoreKey;

/// Errors from record store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A snapshot decoded but does not describe a valid store.
    #[error("invalid snapshot: {reason}")]
    InvalidSnapshot { reason: String },

    /// The requested record is not in the store.
    #[error("record not found: {0}")]
    NotFound(StoreKey),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
