//! Visitors and the rent/return transitions between them and the catalog.
//!
//! Each (visitor, book) pair is either unrented or rented. Renting appends
//! the book to the visitor's list, returning removes it; nothing is recorded
//! on the book itself.

use tracing::debug;

use crate::{
    book::BookId,
    config::RentalPolicy,
    error::{LibraryError, Result},
    events::LedgerEvent,
    library::Library,
    persistence::{SnapshotKind, SnapshotStore},
    rental_state::RentalStatus,
    visitor::{Visitor, VisitorId},
};

impl<S: SnapshotStore> Library<S> {
    /// Register a visitor under the next free id, holding nothing
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::IdSpaceExhausted` if no id is left, or
    /// `LibraryError::Write` if the visitor was added but not saved.
    pub fn add_visitor(&mut self, name: &str) -> Result<Visitor> {
        let id = self.store.visitors_mut().allocate_id()?;
        let visitor = Visitor::new(id, name);
        self.store.visitors_mut().insert(visitor.clone());
        self.commit(SnapshotKind::Visitors, &LedgerEvent::VisitorAdded(id))?;
        Ok(visitor)
    }

    /// All visitors in ascending id order
    #[must_use]
    pub fn visitors(&self) -> Vec<&Visitor> {
        self.store.visitors().iter().collect()
    }

    /// Look up one visitor
    #[must_use]
    pub fn visitor(&self, id: VisitorId) -> Option<&Visitor> {
        self.store.visitors().get(id)
    }

    /// Rent `book` to `visitor`
    ///
    /// # Errors
    ///
    /// Checked in order:
    /// - `LibraryError::VisitorNotFound` if the visitor does not exist
    /// - `LibraryError::BookNotFound` if the book is not in the catalog
    /// - `LibraryError::AlreadyRented` if the visitor already holds the book
    /// - `LibraryError::HeldByAnother` if another visitor holds it and the
    ///   policy is [`RentalPolicy::SingleHolder`]
    ///
    /// Returns `LibraryError::Write` if the rental was recorded but not saved.
    pub fn rent(&mut self, visitor: VisitorId, book: BookId) -> Result<()> {
        let already_held = self
            .store
            .visitors()
            .get(visitor)
            .ok_or(LibraryError::VisitorNotFound(visitor))?
            .holds(book);
        if !self.store.books().contains(book) {
            return Err(LibraryError::BookNotFound(book));
        }
        if already_held {
            return Err(LibraryError::AlreadyRented { visitor, book });
        }
        if self.policy == RentalPolicy::SingleHolder {
            if let Some(&holder) = self.rental_status(book).holders().first() {
                return Err(LibraryError::HeldByAnother { book, holder });
            }
        }

        self.store
            .visitors_mut()
            .get_mut(visitor)
            .ok_or(LibraryError::VisitorNotFound(visitor))?
            .take(book);
        let event = LedgerEvent::Rented { visitor, book };
        self.commit(SnapshotKind::Visitors, &event)
    }

    /// Take `book` back from `visitor`
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::VisitorNotFound` if the visitor does not exist,
    /// `LibraryError::NotRented` if they do not hold the book, or
    /// `LibraryError::Write` if the return was recorded but not saved.
    pub fn return_book(&mut self, visitor: VisitorId, book: BookId) -> Result<()> {
        let record = self
            .store
            .visitors_mut()
            .get_mut(visitor)
            .ok_or(LibraryError::VisitorNotFound(visitor))?;
        if !record.give_back(book) {
            return Err(LibraryError::NotRented { visitor, book });
        }
        let event = LedgerEvent::Returned { visitor, book };
        self.commit(SnapshotKind::Visitors, &event)
    }

    /// Which visitors currently hold `book`
    ///
    /// Works for ids no longer in the catalog, so dangling rentals of deleted
    /// books are visible too.
    #[must_use]
    pub fn rental_status(&self, book: BookId) -> RentalStatus {
        let holders: Vec<VisitorId> = self
            .store
            .visitors()
            .iter()
            .filter(|v| v.holds(book))
            .map(|v| v.id)
            .collect();
        debug!(%book, holders = holders.len(), "rental status derived");
        RentalStatus::from_holders(holders)
    }
}
