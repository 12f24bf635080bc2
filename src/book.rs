use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a book in the catalog
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize,
)]
#[serde(transparent)]
pub struct BookId(pub u32);

impl From<u32> for BookId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<BookId> for u32 {
    fn from(id: BookId) -> Self {
        id.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A book held in the catalog
///
/// Rental status is not stored here; it is derived from visitor records.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Book {
    /// Unique identifier within the catalog
    pub id: BookId,
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
}

impl Book {
    /// Create a new book record
    #[must_use]
    pub fn new(id: BookId, title: &str, author: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            author: author.to_string(),
        }
    }

    /// Case-insensitive substring match against the title
    ///
    /// `lowered_query` must already be lowercase.
    #[must_use]
    pub fn title_matches(&self, lowered_query: &str) -> bool {
        self.title.to_lowercase().contains(lowered_query)
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { id, title, author } = self;
        write!(f, "ID: {id}, Title: {title}, Author: {author}")
    }
}
