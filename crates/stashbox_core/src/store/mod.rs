//! Shared store handle: one SQLite connection plus one commit-generation channel.
//!
//! # Responsibility
//! - Serialize every mutation through a single connection lock.
//! - Republish the full listing of each touched table after commit, all in
//!   one generation.
//!
//! # Invariants
//! - Writes run inside one immediate transaction; readers never observe a
//!   partially applied mutation.
//! - Generations are published while the write lock is still held, so their
//!   version order matches commit order.
//! - The handle is passed explicitly; there is no process-wide instance.

mod stream;

use crate::db::{open_db, open_db_in_memory};
use crate::model::collection::Collection;
use crate::model::item::Item;
use crate::model::storage_box::StorageBox;
use crate::repo::{
    RepoError, RepoResult, SqliteBoxRepository, SqliteCollectionRepository, SqliteItemRepository,
};
use log::{error, info};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio::sync::watch;

pub(crate) use stream::{Generation, Versioned};
pub use stream::{StreamError, TableSnapshot, TableStream};

/// Persisted table identity, used for change routing and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Items,
    Boxes,
    Collections,
}

impl Table {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Items => "items",
            Self::Boxes => "boxes",
            Self::Collections => "collections",
        }
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record type persisted in exactly one table.
pub(crate) trait TableRecord: Clone + Send + Sync + 'static {
    const TABLE: Table;

    /// Reads the whole table in listing order.
    fn load_all(conn: &Connection) -> RepoResult<Vec<Self>>;

    /// This table's slot inside a generation.
    fn slot(generation: &Generation) -> &Versioned<Self>;

    fn slot_mut(generation: &mut Generation) -> &mut Versioned<Self>;
}

struct StoreInner {
    conn: Mutex<Connection>,
    generation: watch::Sender<Generation>,
}

/// Cheaply clonable handle to the inventory store.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Store {
    /// Opens (or creates) a file-backed store.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Self::from_connection(open_db(path)?)
    }

    /// Opens an empty in-memory store.
    pub fn open_in_memory() -> RepoResult<Self> {
        Self::from_connection(open_db_in_memory()?)
    }

    /// Wraps an already migrated connection and loads the initial snapshots.
    pub fn from_connection(conn: Connection) -> RepoResult<Self> {
        let generation = Generation {
            version: 0,
            items: Versioned::initial(Item::load_all(&conn)?),
            boxes: Versioned::initial(StorageBox::load_all(&conn)?),
            collections: Versioned::initial(Collection::load_all(&conn)?),
        };
        Ok(Self {
            inner: Arc::new(StoreInner {
                conn: Mutex::new(conn),
                generation: watch::Sender::new(generation),
            }),
        })
    }

    pub fn items(&self) -> SqliteItemRepository {
        SqliteItemRepository::new(self.clone())
    }

    pub fn boxes(&self) -> SqliteBoxRepository {
        SqliteBoxRepository::new(self.clone())
    }

    pub fn collections(&self) -> SqliteCollectionRepository {
        SqliteCollectionRepository::new(self.clone())
    }

    /// Runs a read against the committed state.
    pub(crate) fn read<T>(&self, f: impl FnOnce(&Connection) -> RepoResult<T>) -> RepoResult<T> {
        let conn = self.lock()?;
        f(&conn)
    }

    /// Runs `f` in one transaction, commits, then republishes `touched` tables
    /// as a single generation.
    ///
    /// Nothing is published when `f` or the commit fails.
    pub(crate) fn write<T>(
        &self,
        op: &'static str,
        touched: &[Table],
        f: impl FnOnce(&Transaction<'_>) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let started_at = Instant::now();
        let mut conn = self.lock()?;

        let result = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(RepoError::from)
            .and_then(|tx| {
                let value = f(&tx)?;
                tx.commit()?;
                Ok(value)
            });

        match result {
            Ok(value) => {
                self.publish(&conn, touched);
                info!(
                    "event=store_write module=store status=ok op={} tables={} duration_ms={}",
                    op,
                    table_list(touched),
                    started_at.elapsed().as_millis()
                );
                Ok(value)
            }
            Err(err) => {
                error!(
                    "event=store_write module=store status=error op={} tables={} duration_ms={} error={}",
                    op,
                    table_list(touched),
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Subscribes to full listings of `T`'s table.
    pub(crate) fn observe<T: TableRecord>(&self) -> TableStream<T> {
        TableStream::new(T::TABLE, self.inner.generation.subscribe(), T::slot)
    }

    /// Subscribes to whole generations, for views that join several tables.
    pub(crate) fn generations(&self) -> watch::Receiver<Generation> {
        self.inner.generation.subscribe()
    }

    fn publish(&self, conn: &Connection, touched: &[Table]) {
        let items = touched.contains(&Table::Items).then(|| reload::<Item>(conn));
        let boxes = touched
            .contains(&Table::Boxes)
            .then(|| reload::<StorageBox>(conn));
        let collections = touched
            .contains(&Table::Collections)
            .then(|| reload::<Collection>(conn));

        self.inner.generation.send_modify(|generation| {
            generation.version += 1;
            let version = generation.version;
            stage(generation, version, items);
            stage(generation, version, boxes);
            stage(generation, version, collections);
        });
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, Connection>> {
        self.inner.conn.lock().map_err(|_| RepoError::LockPoisoned)
    }
}

fn reload<T: TableRecord>(conn: &Connection) -> TableSnapshot<T> {
    T::load_all(conn).map(Arc::new).map_err(|err| {
        error!(
            "event=store_publish module=store status=error table={} error={}",
            T::TABLE,
            err
        );
        StreamError::new(T::TABLE, err.to_string())
    })
}

fn stage<T: TableRecord>(
    generation: &mut Generation,
    version: u64,
    snapshot: Option<TableSnapshot<T>>,
) {
    if let Some(snapshot) = snapshot {
        *T::slot_mut(generation) = Versioned { version, snapshot };
    }
}

fn table_list(tables: &[Table]) -> String {
    tables
        .iter()
        .map(|table| table.as_str())
        .collect::<Vec<_>>()
        .join(",")
}
