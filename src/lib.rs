//! Library catalog and rental ledger persisted to JSON snapshots.
//!
//! This crate tracks books and visitors, lets visitors rent and return
//! books, and rewrites the affected snapshot after every change. A book's
//! rental status is derived from visitor records rather than stored.

pub mod book;
pub mod catalog;
pub mod config;
pub mod console;
pub mod error;
pub mod events;
pub mod ledger;
pub mod library;
pub mod observers;
pub mod persistence;
pub mod rental_state;
pub mod visitor;

pub use book::{Book, BookId};
pub use config::{ConfigOverrides, LibraryConfig, RentalPolicy};
pub use console::Console;
pub use error::{LibraryError, Result};
pub use library::Library;
pub use persistence::{FileSnapshotStore, MemorySnapshotStore, SnapshotKind, SnapshotStore};
pub use rental_state::RentalStatus;
pub use visitor::{Visitor, VisitorId};
