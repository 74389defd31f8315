use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("document error: {0}")]
    Document(#[from] gnc_document::DocumentError),

    #[error("store error: {0}")]
    Store(#[from] gnc_store::StoreError),

    #[error("write error: {0}")]
    Write(#[from] gnc_writer::WriteError),

    #[error("read error: {0}")]
    Read(#[from] gnc_reader::ReadError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache lock poisoned: {0}")]
    LockPoisoned(String),
}

pub type CacheResult<T> = Result<T, CacheError>;
