//! redb-backed persistent store.
//!
//! One `books` table: id string -> JSON-encoded record. redb transactions
//! are synchronous, so every operation runs on the blocking pool; the
//! `Database` handle is opened once at startup and shared for the life of
//! the process.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use tokio::task;

use super::{BookStore, StoreError};
use crate::model::{Book, BookId};

const BOOKS: TableDefinition<&str, &[u8]> = TableDefinition::new("books");

pub struct RedbBookStore {
    db: Arc<Database>,
}

impl RedbBookStore {
    /// Open (or create) the database file and ensure the books table exists,
    /// so reads before the first write don't hit a missing table.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = Database::create(path)?;
        let txn = db.begin_write()?;
        txn.open_table(BOOKS)?;
        txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }

    async fn run<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Database) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        match task::spawn_blocking(move || op(&db)).await {
            Ok(result) => result,
            Err(join) => Err(StoreError::Task(join.to_string())),
        }
    }
}

fn encode(book: &Book) -> Result<Vec<u8>, StoreError> {
    Ok(serde_json::to_vec(book)?)
}

fn decode(bytes: &[u8]) -> Result<Book, StoreError> {
    Ok(serde_json::from_slice(bytes)?)
}

#[async_trait]
impl BookStore for RedbBookStore {
    async fn insert(&self, title: String) -> Result<Book, StoreError> {
        self.run(move |db| {
            let book = Book::new(title);
            let value = encode(&book)?;
            let txn = db.begin_write()?;
            {
                let mut table = txn.open_table(BOOKS)?;
                table.insert(book.id.as_str(), value.as_slice())?;
            }
            txn.commit()?;
            Ok(book)
        })
        .await
    }

    async fn list(&self) -> Result<Vec<Book>, StoreError> {
        self.run(|db| {
            let txn = db.begin_read()?;
            let table = txn.open_table(BOOKS)?;
            let mut books = Vec::new();
            for entry in table.iter()? {
                let (_, value) = entry?;
                books.push(decode(value.value())?);
            }
            Ok(books)
        })
        .await
    }

    async fn get(&self, id: &BookId) -> Result<Option<Book>, StoreError> {
        let id = id.clone();
        self.run(move |db| {
            let txn = db.begin_read()?;
            let table = txn.open_table(BOOKS)?;
            match table.get(id.as_str())? {
                Some(guard) => Ok(Some(decode(guard.value())?)),
                None => Ok(None),
            }
        })
        .await
    }

    async fn append_comment(
        &self,
        id: &BookId,
        comment: String,
    ) -> Result<Option<Book>, StoreError> {
        let id = id.clone();
        self.run(move |db| {
            // Lookup and write share one write transaction, so concurrent
            // appends serialize instead of overwriting each other.
            let txn = db.begin_write()?;
            let updated = {
                let mut table = txn.open_table(BOOKS)?;
                let existing = match table.get(id.as_str())? {
                    Some(guard) => Some(decode(guard.value())?),
                    None => None,
                };
                match existing {
                    Some(mut book) => {
                        book.comments.push(comment);
                        let value = encode(&book)?;
                        table.insert(book.id.as_str(), value.as_slice())?;
                        Some(book)
                    }
                    None => None,
                }
            };
            txn.commit()?;
            Ok(updated)
        })
        .await
    }

    async fn remove(&self, id: &BookId) -> Result<bool, StoreError> {
        let id = id.clone();
        self.run(move |db| {
            let txn = db.begin_write()?;
            let removed = {
                let mut table = txn.open_table(BOOKS)?;
                table.remove(id.as_str())?.is_some()
            };
            txn.commit()?;
            Ok(removed)
        })
        .await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.run(|db| {
            let txn = db.begin_write()?;
            {
                let mut table = txn.open_table(BOOKS)?;
                let keys: Vec<String> = table
                    .iter()?
                    .map(|entry| entry.map(|(key, _)| key.value().to_string()))
                    .collect::<Result<_, _>>()?;
                for key in keys {
                    table.remove(key.as_str())?;
                }
            }
            txn.commit()?;
            Ok(())
        })
        .await
    }
}
