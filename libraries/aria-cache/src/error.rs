//! Error types for the offline audio cache

use thiserror::Error;

/// Result type alias using `CacheError`
pub type Result<T> = std::result::Result<T, CacheError>;

/// Errors from the underlying block store
///
/// These stay internal to the crate: the public `AudioCache` API converts
/// them into `false` / `None` returns after logging, per the non-fatal
/// cache contract. Only `AudioCache::open` surfaces them directly.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Database could not be opened or created
    #[error("Cache open error: {0}")]
    Open(#[from] redb::DatabaseError),

    /// Transaction could not be started
    #[error("Cache transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    /// Table could not be opened
    #[error("Cache table error: {0}")]
    Table(#[from] redb::TableError),

    /// Read or write inside a transaction failed
    #[error("Cache storage error: {0}")]
    Storage(#[from] redb::StorageError),

    /// Transaction failed to commit
    #[error("Cache commit error: {0}")]
    Commit(#[from] redb::CommitError),

    /// Metadata record could not be encoded or decoded
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Blocking storage task was cancelled or panicked
    #[error("Cache task error: {0}")]
    Task(String),
}
