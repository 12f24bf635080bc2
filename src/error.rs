use thiserror::Error;

use crate::{book::BookId, persistence::SnapshotKind, visitor::VisitorId};

/// Errors returned by catalog, ledger and snapshot operations
#[derive(Debug, Error)]
pub enum LibraryError {
    /// No book with this id exists in the catalog
    #[error("Book {0} not found")]
    BookNotFound(BookId),
    /// No visitor with this id exists
    #[error("Visitor {0} not found")]
    VisitorNotFound(VisitorId),
    /// The visitor already holds this book
    #[error("Visitor {visitor} already rented book {book}")]
    AlreadyRented {
        /// Visitor attempting the rental
        visitor: VisitorId,
        /// Book already in their rented list
        book: BookId,
    },
    /// The visitor does not hold this book
    #[error("Book {book} is not currently rented by visitor {visitor}")]
    NotRented {
        /// Visitor attempting the return
        visitor: VisitorId,
        /// Book missing from their rented list
        book: BookId,
    },
    /// Another visitor holds the book and the single-holder policy is active
    #[error("Book {book} is already rented by visitor {holder}")]
    HeldByAnother {
        /// Book being requested
        book: BookId,
        /// Visitor currently holding it
        holder: VisitorId,
    },
    /// Every identifier of this kind has been handed out
    #[error("No {0} identifiers left to allocate")]
    IdSpaceExhausted(SnapshotKind),
    /// A snapshot exists but could not be read
    #[error("Error reading {kind} snapshot: {message}")]
    Read {
        /// Which snapshot failed
        kind: SnapshotKind,
        /// Underlying cause
        message: String,
    },
    /// A snapshot is not valid JSON for its collection
    #[error("Error decoding {kind} snapshot: {source}")]
    Decode {
        /// Which snapshot failed
        kind: SnapshotKind,
        /// Parser error
        #[source]
        source: serde_json::Error,
    },
    /// A snapshot could not be serialized or written
    ///
    /// The in-memory change that triggered the save is kept.
    #[error("Error writing {kind} snapshot: {message}")]
    Write {
        /// Which snapshot failed
        kind: SnapshotKind,
        /// Underlying cause
        message: String,
    },
    /// The configuration file is invalid
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl LibraryError {
    /// Whether the operation was applied in memory but not persisted
    #[must_use]
    pub fn is_persistence_failure(&self) -> bool {
        matches!(self, Self::Write { .. })
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, LibraryError>;
