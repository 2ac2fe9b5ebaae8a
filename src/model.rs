//! The persisted book record and its identifier type.

use std::fmt::{self, Write as _};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Number of hex digits in a well-formed book id.
const ID_LEN: usize = 24;

/// Raised when a supplied string is not a well-formed book id.
///
/// A well-formed id is a syntactic property only; it says nothing about
/// whether a record with that id exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed book id: {0:?}")]
pub struct InvalidBookId(pub String);

/// Store-assigned book identifier: exactly 24 ASCII hex digits.
///
/// Generated ids are lowercase hex over 12 random bytes. Parsing accepts
/// either case; lookups are exact-match on the stored string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(String);

impl BookId {
    /// Generate a fresh id from 12 random bytes.
    pub fn generate() -> Self {
        let uuid = Uuid::new_v4();
        let mut hex = String::with_capacity(ID_LEN);
        for byte in &uuid.as_bytes()[..ID_LEN / 2] {
            // Writing into a String cannot fail.
            let _ = write!(hex, "{byte:02x}");
        }
        Self(hex)
    }

    /// Validate a raw string against the id format.
    pub fn parse(raw: &str) -> Result<Self, InvalidBookId> {
        if raw.len() == ID_LEN && raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            Ok(Self(raw.to_string()))
        } else {
            Err(InvalidBookId(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BookId {
    type Err = InvalidBookId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A persisted book record.
///
/// `title` is fixed at creation; `comments` grows append-only through
/// [`crate::store::BookStore::append_comment`]. The comment count is always
/// derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    #[serde(rename = "_id")]
    pub id: BookId,
    pub title: String,
    #[serde(default)]
    pub comments: Vec<String>,
}

impl Book {
    /// Build a new record with a fresh id and no comments.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: BookId::generate(),
            title: title.into(),
            comments: Vec::new(),
        }
    }

    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }
}
