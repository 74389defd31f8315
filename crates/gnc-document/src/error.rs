//! Error types for document operations.

use thiserror::Error;

/// Errors raised while interpreting a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// The document defines no operation.
    #[error("document contains no operation")]
    NoOperation,

    /// Several operations exist and no name was given.
    #[error("document contains {count} operations; an operation name is required")]
    AmbiguousOperation { count: usize },

    /// No operation carries the requested name.
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    /// A fragment spread names a fragment the document does not define.
    #[error("unknown fragment: {0}")]
    UnknownFragment(String),

    /// A fragment spreads itself, directly or indirectly.
    #[error("fragment cycle through: {0}")]
    FragmentCycle(String),

    /// `@skip` / `@include` without a usable boolean `if` argument.
    #[error("invalid argument for @{directive}: {reason}")]
    InvalidDirectiveArgument { directive: String, reason: String },
}

/// Convenience type alias for document operations.
pub type DocumentResult<T> = std::result::Result<T, DocumentError>;
