use crate::{book::BookId, visitor::VisitorId};

/// Mutations reported to observers after they are applied
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LedgerEvent {
    /// A book was added to the catalog
    BookCreated(BookId),
    /// A book's title or author changed
    BookUpdated(BookId),
    /// A book was removed; `holders` still list it as rented
    BookDeleted {
        /// The removed book
        book: BookId,
        /// Visitors whose rented lists still reference it
        holders: Vec<VisitorId>,
    },
    /// A visitor was registered
    VisitorAdded(VisitorId),
    /// A visitor rented a book
    Rented {
        /// Renting visitor
        visitor: VisitorId,
        /// Rented book
        book: BookId,
    },
    /// A visitor returned a book
    Returned {
        /// Returning visitor
        visitor: VisitorId,
        /// Returned book
        book: BookId,
    },
}
