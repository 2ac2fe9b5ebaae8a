//! Storage boundary for book records.
//!
//! Handlers talk to an injected [`BookStore`] instance and never to a
//! backend directly. The redb backend is the persistent default; the memory
//! backend exists for tests and ephemeral runs.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{StoreBackend, StoreConfig};
use crate::model::{Book, BookId};

mod memory;
mod redb;

pub use self::memory::MemoryBookStore;
pub use self::redb::RedbBookStore;

/// Errors surfaced by a storage backend.
///
/// Anything here is a server-side failure; input validation and not-found
/// are expressed in the operation signatures, not as errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open database: {0}")]
    Open(#[from] ::redb::DatabaseError),

    #[error("transaction failed: {0}")]
    Transaction(#[from] ::redb::TransactionError),

    #[error("table access failed: {0}")]
    Table(#[from] ::redb::TableError),

    #[error("storage failure: {0}")]
    Storage(#[from] ::redb::StorageError),

    #[error("commit failed: {0}")]
    Commit(#[from] ::redb::CommitError),

    #[error("corrupt record in store: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("storage task failed: {0}")]
    Task(String),
}

/// Persistence operations on book records.
///
/// `append_comment` is atomic: the lookup and the write happen inside one
/// transaction (or under one lock), so concurrent appends against the same
/// record never lose entries.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Persist a new book with the given title and no comments.
    async fn insert(&self, title: String) -> Result<Book, StoreError>;

    /// All books, in the backend's natural key order.
    async fn list(&self) -> Result<Vec<Book>, StoreError>;

    async fn get(&self, id: &BookId) -> Result<Option<Book>, StoreError>;

    /// Append one comment and return the updated record, or `None` if no
    /// record has this id.
    async fn append_comment(&self, id: &BookId, comment: String)
    -> Result<Option<Book>, StoreError>;

    /// Delete one record. Returns whether anything was deleted.
    async fn remove(&self, id: &BookId) -> Result<bool, StoreError>;

    /// Delete every record. Deleting from an empty store succeeds.
    async fn clear(&self) -> Result<(), StoreError>;
}

/// Open the backend selected by configuration.
pub fn open(config: &StoreConfig) -> Result<Arc<dyn BookStore>, StoreError> {
    match config.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryBookStore::new())),
        StoreBackend::Redb => {
            // validate() guarantees a path when the backend is redb.
            let path = config
                .path
                .as_deref()
                .unwrap_or_else(|| Path::new("bookshelf.redb"));
            Ok(Arc::new(RedbBookStore::open(path)?))
        }
    }
}
