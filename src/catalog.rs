//! Create, read, update, delete and search over the book catalog.

use tracing::debug;

use crate::{
    book::{Book, BookId},
    error::{LibraryError, Result},
    events::LedgerEvent,
    library::Library,
    persistence::{SnapshotKind, SnapshotStore},
};

impl<S: SnapshotStore> Library<S> {
    /// Add a book under the next free id and persist the catalog
    ///
    /// Empty titles and authors are accepted as-is.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::IdSpaceExhausted` if no id is left, or
    /// `LibraryError::Write` if the book was added but the snapshot could not
    /// be saved.
    pub fn create_book(&mut self, title: &str, author: &str) -> Result<Book> {
        let id = self.store.books_mut().allocate_id()?;
        let book = Book::new(id, title, author);
        self.store.books_mut().insert(book.clone());
        self.commit(SnapshotKind::Books, &LedgerEvent::BookCreated(id))?;
        Ok(book)
    }

    /// All books in ascending id order
    #[must_use]
    pub fn books(&self) -> Vec<&Book> {
        self.store.books().iter().collect()
    }

    /// Look up one book
    #[must_use]
    pub fn book(&self, id: BookId) -> Option<&Book> {
        self.store.books().get(id)
    }

    /// Books whose title contains `query`, ignoring case
    #[must_use]
    pub fn search_books(&self, query: &str) -> Vec<&Book> {
        let query = query.to_lowercase();
        let found: Vec<&Book> = self
            .store
            .books()
            .iter()
            .filter(|book| book.title_matches(&query))
            .collect();
        debug!(%query, matches = found.len(), "catalog searched");
        found
    }

    /// Replace a book's title and author
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::BookNotFound` if `id` is not in the catalog
    /// (nothing is written), or `LibraryError::Write` if the update was applied
    /// but not saved.
    pub fn update_book(&mut self, id: BookId, title: &str, author: &str) -> Result<Book> {
        let book = self
            .store
            .books_mut()
            .get_mut(id)
            .ok_or(LibraryError::BookNotFound(id))?;
        title.clone_into(&mut book.title);
        author.clone_into(&mut book.author);
        let updated = book.clone();
        self.commit(SnapshotKind::Books, &LedgerEvent::BookUpdated(id))?;
        Ok(updated)
    }

    /// Remove a book from the catalog
    ///
    /// Visitors that rented it keep the id in their rented lists.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::BookNotFound` if `id` is not in the catalog
    /// (nothing is written), or `LibraryError::Write` if the removal was
    /// applied but not saved.
    pub fn delete_book(&mut self, id: BookId) -> Result<Book> {
        let removed = self
            .store
            .books_mut()
            .remove(id)
            .ok_or(LibraryError::BookNotFound(id))?;
        let holders = self.rental_status(id).holders().to_vec();
        let event = LedgerEvent::BookDeleted { book: id, holders };
        self.commit(SnapshotKind::Books, &event)?;
        Ok(removed)
    }
}
