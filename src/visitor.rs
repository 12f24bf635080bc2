use std::fmt;

use serde::{Deserialize, Serialize};

use crate::book::BookId;

/// Identifier of a visitor, independent of the book id space
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize,
)]
#[serde(transparent)]
pub struct VisitorId(pub u32);

impl From<u32> for VisitorId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<VisitorId> for u32 {
    fn from(id: VisitorId) -> Self {
        id.0
    }
}

impl fmt::Display for VisitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A library visitor and the books they currently hold
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "StoredVisitor")]
pub struct Visitor {
    /// Unique identifier among visitors
    pub id: VisitorId,
    /// Display name
    pub name: String,
    /// Rented books in the order they were rented, without duplicates
    #[serde(rename = "rented_book_id")]
    pub rented_book_ids: Vec<BookId>,
}

/// Visitor as found in a snapshot, where an empty rental list may be `null`
#[derive(Deserialize)]
struct StoredVisitor {
    /// Unique identifier among visitors
    id: VisitorId,
    /// Display name
    name: String,
    /// Rented books, absent or `null` when there are none
    #[serde(rename = "rented_book_id", default)]
    rented_book_ids: Option<Vec<BookId>>,
}

impl From<StoredVisitor> for Visitor {
    fn from(stored: StoredVisitor) -> Self {
        Self {
            id: stored.id,
            name: stored.name,
            rented_book_ids: stored.rented_book_ids.unwrap_or_default(),
        }
    }
}

impl Visitor {
    /// Create a visitor holding no books
    #[must_use]
    pub fn new(id: VisitorId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            rented_book_ids: Vec::new(),
        }
    }

    /// Whether this visitor currently holds `book`
    #[must_use]
    pub fn holds(&self, book: BookId) -> bool {
        self.rented_book_ids.contains(&book)
    }

    /// Record a rental. Returns `false` if the book was already held.
    pub fn take(&mut self, book: BookId) -> bool {
        if self.holds(book) {
            return false;
        }
        self.rented_book_ids.push(book);
        true
    }

    /// Give a book back, keeping the order of the remaining rentals.
    /// Returns `false` if the book was not held.
    pub fn give_back(&mut self, book: BookId) -> bool {
        match self.rented_book_ids.iter().position(|held| *held == book) {
            Some(pos) => {
                self.rented_book_ids.remove(pos);
                true
            }
            None => false,
        }
    }

    /// `none`, or `Book ID(s) a, b` in rental order
    #[must_use]
    pub fn renting_summary(&self) -> String {
        if self.rented_book_ids.is_empty() {
            return "none".to_string();
        }
        let held = &self.rented_book_ids;
        let ids: Vec<String> = held.iter().map(ToString::to_string).collect();
        format!("Book ID(s) {}", ids.join(", "))
    }
}

impl fmt::Display for Visitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let renting = self.renting_summary();
        let Self { id, name, .. } = self;
        write!(f, "ID: {id}, Name: {name}, Renting: {renting}")
    }
}
