use thiserror::Error;

/// Errors from [`crate::PackageStore`] operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A statement ran but its result could not be read.
    #[error("store query: {0}")]
    Query(String),

    #[error("store migration: {0}")]
    Migration(String),

    /// No row matched a statement that required one.
    #[error("no matching record")]
    NoResult,

    /// A document column is not valid record JSON.
    #[error("record document: {0}")]
    Document(#[from] serde_json::Error),

    #[error(transparent)]
    LibSql(#[from] libsql::Error),

    /// The store directory could not be created.
    #[error("store directory: {0}")]
    Io(#[from] std::io::Error),
}
