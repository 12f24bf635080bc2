//! Snapshot persistence for the book and visitor collections.
//!
//! Each collection is stored as one pretty-printed JSON object keyed by the
//! textual id, and the whole object is rewritten after every mutation.

use std::{
    collections::BTreeMap,
    fmt,
    fs::File,
    io::{ErrorKind, Read, Write},
    path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, error, info, warn};

use crate::{
    book::{Book, BookId},
    error::{LibraryError, Result},
    visitor::{Visitor, VisitorId},
};

/// The two independently persisted collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotKind {
    /// The book catalog
    Books,
    /// The visitor records
    Visitors,
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Books => write!(f, "books"),
            Self::Visitors => write!(f, "visitors"),
        }
    }
}

/// Backend that stores raw snapshot text per collection
pub trait SnapshotStore {
    /// Read a snapshot. `Ok(None)` means none has been written yet.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Read` if the snapshot exists but cannot be read.
    fn read(&self, kind: SnapshotKind) -> Result<Option<String>>;

    /// Replace a snapshot with `contents`.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Write` if the snapshot cannot be written.
    fn write(&mut self, kind: SnapshotKind, contents: &str) -> Result<()>;
}

/// Snapshots kept as two files on disk
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    /// Path of the books snapshot
    books_path: PathBuf,
    /// Path of the visitors snapshot
    visitors_path: PathBuf,
}

impl FileSnapshotStore {
    /// Create a store over the two snapshot paths
    #[must_use]
    pub fn new(books_path: impl Into<PathBuf>, visitors_path: impl Into<PathBuf>) -> Self {
        Self {
            books_path: books_path.into(),
            visitors_path: visitors_path.into(),
        }
    }

    /// Path backing the given collection
    #[must_use]
    pub fn path(&self, kind: SnapshotKind) -> &Path {
        match kind {
            SnapshotKind::Books => &self.books_path,
            SnapshotKind::Visitors => &self.visitors_path,
        }
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn read(&self, kind: SnapshotKind) -> Result<Option<String>> {
        let path = self.path(kind);
        debug!(%kind, path = %path.display(), "loading snapshot");

        let mut file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(LibraryError::Read {
                    kind,
                    message: format!("Failed to open {}: {e}", path.display()),
                });
            }
        };

        let mut contents = String::new();
        file.read_to_string(&mut contents).map_err(|e| LibraryError::Read {
            kind,
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Ok(Some(contents))
    }

    fn write(&mut self, kind: SnapshotKind, contents: &str) -> Result<()> {
        let path = self.path(kind);
        debug!(%kind, path = %path.display(), "saving snapshot");

        let mut file = File::create(path).map_err(|e| LibraryError::Write {
            kind,
            message: format!("Failed to create {}: {e}", path.display()),
        })?;
        file.write_all(contents.as_bytes()).map_err(|e| LibraryError::Write {
            kind,
            message: format!("Failed to write {}: {e}", path.display()),
        })
    }
}

/// Snapshots held in memory, for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    /// Current books snapshot text
    books: Option<String>,
    /// Current visitors snapshot text
    visitors: Option<String>,
    /// When set, every write fails
    fail_writes: bool,
    /// Number of successful writes
    writes: usize,
}

impl MemorySnapshotStore {
    /// An empty store with no snapshots
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a snapshot with raw text
    #[must_use]
    pub fn with_snapshot(mut self, kind: SnapshotKind, contents: &str) -> Self {
        *self.slot(kind) = Some(contents.to_string());
        self
    }

    /// Make subsequent writes fail (or succeed again)
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Number of successful writes so far
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Current text of a snapshot
    #[must_use]
    pub fn snapshot(&self, kind: SnapshotKind) -> Option<&str> {
        match kind {
            SnapshotKind::Books => self.books.as_deref(),
            SnapshotKind::Visitors => self.visitors.as_deref(),
        }
    }

    /// Mutable slot for a snapshot
    fn slot(&mut self, kind: SnapshotKind) -> &mut Option<String> {
        match kind {
            SnapshotKind::Books => &mut self.books,
            SnapshotKind::Visitors => &mut self.visitors,
        }
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn read(&self, kind: SnapshotKind) -> Result<Option<String>> {
        Ok(self.snapshot(kind).map(str::to_string))
    }

    fn write(&mut self, kind: SnapshotKind, contents: &str) -> Result<()> {
        if self.fail_writes {
            return Err(LibraryError::Write {
                kind,
                message: "writes are disabled".to_string(),
            });
        }
        *self.slot(kind) = Some(contents.to_string());
        self.writes = self.writes.saturating_add(1);
        Ok(())
    }
}

/// An entity stored in a keyed collection
pub trait Record: Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned {
    /// Identifier type, convertible to and from the raw counter value
    type Id: Copy + Ord + fmt::Debug + From<u32> + Into<u32> + Serialize + DeserializeOwned;

    /// Which snapshot this record lives in
    const KIND: SnapshotKind;

    /// The record's own identifier
    fn id(&self) -> Self::Id;
}

impl Record for Book {
    type Id = BookId;

    const KIND: SnapshotKind = SnapshotKind::Books;

    fn id(&self) -> BookId {
        self.id
    }
}

impl Record for Visitor {
    type Id = VisitorId;

    const KIND: SnapshotKind = SnapshotKind::Visitors;

    fn id(&self) -> VisitorId {
        self.id
    }
}

/// A mapping from id to record, ordered by id, with its id allocator
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T: Record> {
    /// Records keyed by id
    records: BTreeMap<T::Id, T>,
    /// Next id to hand out; `None` once the id space is used up
    next_id: Option<u32>,
}

impl<T: Record> Default for Collection<T> {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
            next_id: Some(1),
        }
    }
}

impl<T: Record> Collection<T> {
    /// Build a collection from records, recomputing the next id
    #[must_use]
    pub fn from_records(records: BTreeMap<T::Id, T>) -> Self {
        let highest = records
            .iter()
            .map(|(key, record)| {
                let key: u32 = (*key).into();
                let inner: u32 = record.id().into();
                key.max(inner)
            })
            .max();
        let next_id = match highest {
            Some(highest) => highest.checked_add(1),
            None => Some(1),
        };
        Self { records, next_id }
    }

    /// Parse a snapshot
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Decode` if the text is not a valid snapshot.
    pub fn decode(contents: &str) -> Result<Self> {
        let records = serde_json::from_str::<BTreeMap<T::Id, T>>(contents);
        let records = records.map_err(|source| LibraryError::Decode {
            kind: T::KIND,
            source,
        })?;
        Ok(Self::from_records(records))
    }

    /// Render the pretty-printed snapshot
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Write` if serialization fails.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.records).map_err(|e| LibraryError::Write {
            kind: T::KIND,
            message: e.to_string(),
        })
    }

    /// Hand out the next id
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::IdSpaceExhausted` once `u32::MAX` has been used.
    pub fn allocate_id(&mut self) -> Result<T::Id> {
        let raw = self.next_id.ok_or(LibraryError::IdSpaceExhausted(T::KIND))?;
        self.next_id = raw.checked_add(1);
        Ok(raw.into())
    }

    /// The id the next allocation will return
    #[must_use]
    pub fn next_id(&self) -> Option<T::Id> {
        self.next_id.map(Into::into)
    }

    /// Look up a record
    #[must_use]
    pub fn get(&self, id: T::Id) -> Option<&T> {
        self.records.get(&id)
    }

    /// Look up a record for modification
    pub fn get_mut(&mut self, id: T::Id) -> Option<&mut T> {
        self.records.get_mut(&id)
    }

    /// Whether a record with this id exists
    #[must_use]
    pub fn contains(&self, id: T::Id) -> bool {
        self.records.contains_key(&id)
    }

    /// Insert a record under its own id
    pub fn insert(&mut self, record: T) -> Option<T> {
        self.records.insert(record.id(), record)
    }

    /// Remove a record
    pub fn remove(&mut self, id: T::Id) -> Option<T> {
        self.records.remove(&id)
    }

    /// Records in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.records.values()
    }

    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the collection is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// What happened when one snapshot was loaded
#[derive(Debug)]
pub enum LoadReport {
    /// The snapshot was read and decoded
    Loaded {
        /// Which collection
        kind: SnapshotKind,
        /// Number of records loaded
        count: usize,
    },
    /// No snapshot exists yet; the collection starts empty
    Missing {
        /// Which collection
        kind: SnapshotKind,
    },
    /// The snapshot could not be read or decoded; the collection starts empty
    Failed {
        /// Which collection
        kind: SnapshotKind,
        /// Cause
        error: LibraryError,
    },
}

impl LoadReport {
    /// Whether the load produced an error rather than a usable or absent snapshot
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loaded { kind, count } => write!(f, "Loaded {count} {kind}."),
            Self::Missing { kind } => match kind {
                SnapshotKind::Books => write!(f, "No data file found, starting fresh."),
                SnapshotKind::Visitors => write!(f, "No visitors file found."),
            },
            Self::Failed { error, .. } => write!(f, "{error}"),
        }
    }
}

/// Load one collection from the backend
fn load_collection<T: Record, S: SnapshotStore>(backend: &S) -> (Collection<T>, LoadReport) {
    let kind = T::KIND;
    let outcome = match backend.read(kind) {
        Ok(Some(contents)) => Collection::<T>::decode(&contents).map(Some),
        Ok(None) => Ok(None),
        Err(error) => Err(error),
    };

    match outcome {
        Ok(Some(collection)) => {
            let count = collection.len();
            info!(%kind, count, "snapshot loaded");
            (collection, LoadReport::Loaded { kind, count })
        }
        Ok(None) => {
            warn!(%kind, "no snapshot found, starting empty");
            (Collection::default(), LoadReport::Missing { kind })
        }
        Err(error) => {
            error!(%kind, %error, "snapshot unusable, starting empty");
            (Collection::default(), LoadReport::Failed { kind, error })
        }
    }
}

/// Owns both collections and writes them through a snapshot backend
#[derive(Debug)]
pub struct RecordStore<S> {
    /// Where snapshots are read from and written to
    backend: S,
    /// The book catalog
    books: Collection<Book>,
    /// The visitor records
    visitors: Collection<Visitor>,
}

impl<S: SnapshotStore> RecordStore<S> {
    /// Load both collections, starting empty where a snapshot is missing or broken
    #[must_use]
    pub fn load(backend: S) -> (Self, Vec<LoadReport>) {
        let (books, books_report) = load_collection::<Book, S>(&backend);
        let (visitors, visitors_report) = load_collection::<Visitor, S>(&backend);
        let store = Self {
            backend,
            books,
            visitors,
        };
        (store, vec![books_report, visitors_report])
    }

    /// Rewrite the full snapshot of one collection
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Write` if encoding or writing fails. In-memory
    /// state is left untouched either way.
    pub fn save(&mut self, kind: SnapshotKind) -> Result<()> {
        let contents = match kind {
            SnapshotKind::Books => self.books.encode(),
            SnapshotKind::Visitors => self.visitors.encode(),
        };
        let result = contents.and_then(|contents| self.backend.write(kind, &contents));
        if let Err(error) = &result {
            error!(%kind, %error, "snapshot not saved, in-memory state kept");
        }
        result
    }

    /// The book catalog
    #[must_use]
    pub fn books(&self) -> &Collection<Book> {
        &self.books
    }

    /// The book catalog, mutably
    pub fn books_mut(&mut self) -> &mut Collection<Book> {
        &mut self.books
    }

    /// The visitor records
    #[must_use]
    pub fn visitors(&self) -> &Collection<Visitor> {
        &self.visitors
    }

    /// The visitor records, mutably
    pub fn visitors_mut(&mut self) -> &mut Collection<Visitor> {
        &mut self.visitors
    }

    /// The snapshot backend
    #[must_use]
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// The snapshot backend, mutably
    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    /// Give back the snapshot backend
    #[must_use]
    pub fn into_backend(self) -> S {
        self.backend
    }
}
