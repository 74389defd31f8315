use gnc_document::DocumentError;

/// Errors that abort a write before anything reaches the store.
///
/// Shape problems inside the response are not errors; they are reported as
/// [`MissingField`](gnc_types::MissingField)s in the write report.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// The document could not be interpreted.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// The response data is not a JSON object.
    #[error("response data must be an object, found {found}")]
    ResponseNotObject { found: String },
}

/// Result alias for write operations.
pub type WriteResult<T> = Result<T, WriteError>;
