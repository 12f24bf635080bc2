use std::collections::BTreeSet;

use library_catalog::{BookId, Library, LibraryError, MemorySnapshotStore, RentalPolicy};
use proptest::prelude::*;

/// One catalog mutation
#[derive(Debug, Clone)]
enum Op {
    /// Create a book with this title
    Create(String),
    /// Update the book with this id
    Update(u32),
    /// Delete the book with this id
    Delete(u32),
}

/// Turn a library error into a failed test case
fn failure(error: &LibraryError) -> TestCaseError {
    TestCaseError::fail(error.to_string())
}

/// Random mix of catalog mutations over a small id range
fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        "[a-z]{0,8}".prop_map(Op::Create),
        (1u32..12).prop_map(Op::Update),
        (1u32..12).prop_map(Op::Delete),
    ]
}

proptest! {
    #[test]
    fn id_set_is_created_minus_deleted(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let (mut library, _) = Library::open(MemorySnapshotStore::new(), RentalPolicy::Permissive);
        let mut expected = BTreeSet::new();

        for op in ops {
            match op {
                Op::Create(title) => {
                    let book = library.create_book(&title, "author").map_err(|e| failure(&e))?;
                    prop_assert!(expected.insert(book.id));
                }
                Op::Update(id) => {
                    let result = library.update_book(BookId(id), "new", "author");
                    prop_assert_eq!(result.is_ok(), expected.contains(&BookId(id)));
                }
                Op::Delete(id) => {
                    let result = library.delete_book(BookId(id));
                    prop_assert_eq!(result.is_ok(), expected.remove(&BookId(id)));
                }
            }
        }

        let present: BTreeSet<BookId> = library.books().iter().map(|b| b.id).collect();
        prop_assert_eq!(&present, &expected);

        // Reloading keeps the same ids and restarts allocation above the highest
        let backend = library.store().backend().clone();
        let (mut reopened, _) = Library::open(backend, RentalPolicy::Permissive);
        let reloaded: BTreeSet<BookId> = reopened.books().iter().map(|b| b.id).collect();
        prop_assert_eq!(&reloaded, &expected);

        let next = reopened.create_book("next", "author").map_err(|e| failure(&e))?;
        let highest = expected.iter().next_back();
        let expected_next = highest.map_or(1, |id| id.0.saturating_add(1));
        prop_assert_eq!(next.id, BookId(expected_next));
    }
}
