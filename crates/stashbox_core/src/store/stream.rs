//! Commit generations and the per-table subscription handle over them.

use super::Table;
use crate::model::collection::Collection;
use crate::model::item::Item;
use crate::model::storage_box::StorageBox;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;
use tokio::sync::watch;

/// Full listing of one table, or the failure that replaced it.
pub type TableSnapshot<T> = Result<Arc<Vec<T>>, StreamError>;

/// A table listing could not be re-read after a committed mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamError {
    pub table: Table,
    pub message: String,
}

impl StreamError {
    pub fn new(table: Table, message: impl Into<String>) -> Self {
        Self {
            table,
            message: message.into(),
        }
    }
}

impl Display for StreamError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to observe `{}`: {}", self.table, self.message)
    }
}

impl Error for StreamError {}

/// One table's listing, stamped with the generation that last rewrote it.
#[derive(Debug, Clone)]
pub(crate) struct Versioned<T> {
    pub(crate) version: u64,
    pub(crate) snapshot: TableSnapshot<T>,
}

impl<T> Versioned<T> {
    pub(crate) fn initial(listing: Vec<T>) -> Self {
        Self {
            version: 0,
            snapshot: Ok(Arc::new(listing)),
        }
    }
}

/// Every table's listing as of one commit.
///
/// A commit that touches several tables replaces all of their slots in one
/// send, so a reader never pairs a post-commit listing with a pre-commit one.
#[derive(Debug, Clone)]
pub(crate) struct Generation {
    pub(crate) version: u64,
    pub(crate) items: Versioned<Item>,
    pub(crate) boxes: Versioned<StorageBox>,
    pub(crate) collections: Versioned<Collection>,
}

pub(crate) type Slot<T> = fn(&Generation) -> &Versioned<T>;

/// Live view over a table's listings.
///
/// The first [`next`](Self::next) resolves immediately with the listing that
/// was current at subscription time; later calls wait for a commit that
/// rewrites this table. Intermediate listings may be skipped when several
/// commits land between two reads, but the newest listing is always
/// delivered. Dropping the stream ends the subscription.
pub struct TableStream<T> {
    table: Table,
    receiver: watch::Receiver<Generation>,
    slot: Slot<T>,
    seen: Option<u64>,
}

impl<T> TableStream<T> {
    pub(crate) fn new(table: Table, receiver: watch::Receiver<Generation>, slot: Slot<T>) -> Self {
        Self {
            table,
            receiver,
            slot,
            seen: None,
        }
    }

    pub fn table(&self) -> Table {
        self.table
    }

    /// Latest published listing, without marking it as seen.
    pub fn current(&self) -> TableSnapshot<T> {
        let generation = self.receiver.borrow();
        (self.slot)(&generation).snapshot.clone()
    }

    /// Whether a listing is waiting that `next` has not returned yet.
    ///
    /// Returns `false` once the store has been dropped.
    pub fn has_changed(&self) -> bool {
        if self.receiver.has_changed().is_err() {
            return false;
        }
        let generation = self.receiver.borrow();
        Some((self.slot)(&generation).version) != self.seen
    }

    /// Returns the latest listing and marks it as seen.
    pub fn latest(&mut self) -> TableSnapshot<T> {
        let generation = self.receiver.borrow_and_update();
        let slot = (self.slot)(&generation);
        self.seen = Some(slot.version);
        slot.snapshot.clone()
    }

    /// Waits for the next unseen listing.
    ///
    /// Returns `None` once every handle to the store has been dropped.
    pub async fn next(&mut self) -> Option<TableSnapshot<T>> {
        loop {
            {
                let generation = self.receiver.borrow_and_update();
                let slot = (self.slot)(&generation);
                if Some(slot.version) != self.seen {
                    self.seen = Some(slot.version);
                    return Some(slot.snapshot.clone());
                }
            }
            self.receiver.changed().await.ok()?;
        }
    }
}

impl<T> Clone for TableStream<T> {
    fn clone(&self) -> Self {
        Self {
            table: self.table,
            receiver: self.receiver.clone(),
            slot: self.slot,
            seen: self.seen,
        }
    }
}

impl<T> Debug for TableStream<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableStream")
            .field("table", &self.table)
            .field("seen", &self.seen)
            .finish()
    }
}
