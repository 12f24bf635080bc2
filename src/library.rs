use std::fmt;

use crate::{
    config::RentalPolicy,
    error::Result,
    events::LedgerEvent,
    observers::{DanglingRentalWarner, LedgerObserver, TracingObserver},
    persistence::{LoadReport, RecordStore, SnapshotKind, SnapshotStore},
};

/// The catalog and rental ledger, owning all in-memory state
///
/// Catalog operations live in `catalog.rs`, rental operations in `ledger.rs`.
pub struct Library<S> {
    /// Book and visitor collections plus their snapshot backend
    pub(crate) store: RecordStore<S>,
    /// How rent requests are validated across visitors
    pub(crate) policy: RentalPolicy,
    /// Registered event observers
    observers: Vec<Box<dyn LedgerObserver>>,
}

// Manual implementation of Debug for Library
impl<S: fmt::Debug> fmt::Debug for Library<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Library")
            .field("store", &self.store)
            .field("policy", &self.policy)
            .field("observers_count", &self.observers.len())
            .finish()
    }
}

impl<S: SnapshotStore> Library<S> {
    /// Load both collections from `backend` with no observers attached
    ///
    /// Missing or unusable snapshots leave the collection empty; the returned
    /// reports say which happened.
    #[must_use]
    pub fn open(backend: S, policy: RentalPolicy) -> (Self, Vec<LoadReport>) {
        let (store, reports) = RecordStore::load(backend);
        let library = Self {
            store,
            policy,
            observers: Vec::new(),
        };
        (library, reports)
    }

    /// Like [`Library::open`], with the standard logging observers attached
    #[must_use]
    pub fn open_with_default_observers(
        backend: S,
        policy: RentalPolicy,
    ) -> (Self, Vec<LoadReport>) {
        let (mut library, reports) = Self::open(backend, policy);
        library.register_observer(Box::new(TracingObserver));
        library.register_observer(Box::new(DanglingRentalWarner));
        (library, reports)
    }

    /// Register an observer to be notified of applied mutations
    pub fn register_observer(&mut self, observer: Box<dyn LedgerObserver>) {
        self.observers.push(observer);
    }

    /// Active rental policy
    #[must_use]
    pub fn policy(&self) -> RentalPolicy {
        self.policy
    }

    /// Underlying record store
    #[must_use]
    pub fn store(&self) -> &RecordStore<S> {
        &self.store
    }

    /// Underlying record store, mutably
    pub fn store_mut(&mut self) -> &mut RecordStore<S> {
        &mut self.store
    }

    /// Persist `kind` after a mutation, then notify observers
    ///
    /// Observers are told about the event even when the save fails, since the
    /// change stands in memory.
    pub(crate) fn commit(&mut self, kind: SnapshotKind, event: &LedgerEvent) -> Result<()> {
        let saved = self.store.save(kind);
        for observer in &self.observers {
            observer.on_event(event);
        }
        saved
    }
}

impl<S: SnapshotStore> fmt::Display for Library<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} book(s), {} visitor(s)",
            self.store.books().len(),
            self.store.visitors().len()
        )
    }
}
