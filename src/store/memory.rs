//! In-memory backend, used by tests and ephemeral runs.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{BookStore, StoreError};
use crate::model::{Book, BookId};

/// `BTreeMap` behind an `RwLock`; listing returns id order.
#[derive(Debug, Default)]
pub struct MemoryBookStore {
    books: RwLock<BTreeMap<BookId, Book>>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<BookId, Book>> {
        self.books
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<BookId, Book>> {
        self.books
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn insert(&self, title: String) -> Result<Book, StoreError> {
        let book = Book::new(title);
        self.write().insert(book.id.clone(), book.clone());
        Ok(book)
    }

    async fn list(&self) -> Result<Vec<Book>, StoreError> {
        Ok(self.read().values().cloned().collect())
    }

    async fn get(&self, id: &BookId) -> Result<Option<Book>, StoreError> {
        Ok(self.read().get(id).cloned())
    }

    async fn append_comment(
        &self,
        id: &BookId,
        comment: String,
    ) -> Result<Option<Book>, StoreError> {
        let mut books = self.write();
        Ok(books.get_mut(id).map(|book| {
            book.comments.push(comment);
            book.clone()
        }))
    }

    async fn remove(&self, id: &BookId) -> Result<bool, StoreError> {
        Ok(self.write().remove(id).is_some())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.write().clear();
        Ok(())
    }
}
