use gnc_document::DocumentError;
use gnc_types::ResponsePath;

/// Errors from read operations.
///
/// Missing data is only an error for strict reads; ordinary reads report it
/// in the [`ReadOutcome`](crate::ReadOutcome).
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// The document could not be interpreted.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// A strict read found fields the store cannot supply.
    #[error("incomplete data: {} field(s) missing", .paths.len())]
    MissingData { paths: Vec<ResponsePath> },
}

/// Result alias for read operations.
pub type ReadResult<T> = Result<T, ReadError>;
