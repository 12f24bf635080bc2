use tracing::{info, warn};

use crate::events::LedgerEvent;

/// Trait for ledger event observation
pub trait LedgerObserver {
    /// Called after a mutation has been applied in memory
    fn on_event(&self, event: &LedgerEvent);
}

/// Logs every event through `tracing`
#[derive(Debug)]
pub struct TracingObserver;

impl LedgerObserver for TracingObserver {
    fn on_event(&self, event: &LedgerEvent) {
        match event {
            LedgerEvent::BookCreated(book) => info!(%book, "book created"),
            LedgerEvent::BookUpdated(book) => info!(%book, "book updated"),
            LedgerEvent::BookDeleted { book, .. } => info!(%book, "book deleted"),
            LedgerEvent::VisitorAdded(visitor) => info!(%visitor, "visitor added"),
            LedgerEvent::Rented { visitor, book } => info!(%visitor, %book, "book rented"),
            LedgerEvent::Returned { visitor, book } => info!(%visitor, %book, "book returned"),
        }
    }
}

/// Warns when a deleted book is still listed in visitors' rentals
#[derive(Debug)]
pub struct DanglingRentalWarner;

impl LedgerObserver for DanglingRentalWarner {
    fn on_event(&self, event: &LedgerEvent) {
        if let LedgerEvent::BookDeleted { book, holders } = event {
            if !holders.is_empty() {
                warn!(%book, ?holders, "deleted book is still rented");
            }
        }
    }
}
