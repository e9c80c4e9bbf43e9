//! Repository layer: CRUD plus reactive listings, one repository per table.
//!
//! # Responsibility
//! - Keep SQL details inside the persistence boundary.
//! - Route every mutation through `Store::write` so subscribers see it.
//!
//! # Invariants
//! - Writes call the record's `validate()` before SQL mutations.
//! - `update` on a missing id fails with `NotFound`; `delete` on a missing id
//!   is a silent no-op.
//! - Deleting a parent orphans its children (`NULL` foreign key) and
//!   refreshes their `last_modified`.

mod background;
pub mod box_repo;
pub mod collection_repo;
pub mod item_repo;
mod sql;

use crate::db::DbError;
use crate::model::ValidationError;
use crate::store::{Table, TableStream};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub use background::AsyncRepository;
pub(crate) use background::run_blocking;
pub use box_repo::SqliteBoxRepository;
pub use collection_repo::SqliteCollectionRepository;
pub use item_repo::SqliteItemRepository;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for inventory persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Record rejected before it reached storage.
    Validation(ValidationError),
    /// Storage engine failure (I/O, constraint violation, bootstrap).
    Db(DbError),
    /// Update targeted an id that is not stored.
    NotFound { table: Table, id: Uuid },
    /// Stored row cannot be converted to a valid record.
    InvalidData(String),
    /// A writer panicked while holding the connection lock.
    LockPoisoned,
    /// No Tokio runtime to run on, or the blocking task died.
    Runtime(String),
}

impl RepoError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { table, id } => write!(f, "{table} record not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::LockPoisoned => write!(f, "store connection lock is poisoned"),
            Self::Runtime(message) => write!(f, "background runtime failure: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. }
            | Self::InvalidData(_)
            | Self::LockPoisoned
            | Self::Runtime(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// CRUD and observation contract shared by every table.
pub trait Repository {
    type Entity;
    type Id: Copy;
    type Update;

    /// Subscribes to full listings; the current listing arrives first.
    fn observe_all(&self) -> TableStream<Self::Entity>;

    /// One-shot full listing.
    fn list_all(&self) -> RepoResult<Vec<Self::Entity>>;

    /// One-shot point read.
    fn get(&self, id: Self::Id) -> RepoResult<Option<Self::Entity>>;

    /// Upserts one record; see [`insert_all`](Self::insert_all).
    fn insert(&self, entity: &Self::Entity) -> RepoResult<Self::Entity> {
        self.insert_all(std::slice::from_ref(entity))?
            .pop()
            .ok_or_else(|| RepoError::InvalidData("insert returned no record".to_string()))
    }

    /// Upserts a batch atomically: all records are stored or none are.
    ///
    /// Nil ids are replaced with fresh ones and `last_modified` is refreshed.
    /// Returns the records exactly as stored, in input order.
    fn insert_all(&self, entities: &[Self::Entity]) -> RepoResult<Vec<Self::Entity>>;

    /// Merges the patch into the stored record and returns the result.
    fn update(&self, update: &Self::Update) -> RepoResult<Self::Entity>;

    /// Removes one record; missing ids are ignored.
    fn delete(&self, id: Self::Id) -> RepoResult<()>;

    /// Removes every record of this type.
    ///
    /// Meant for resetting demo data only; callers gate it.
    fn clear(&self) -> RepoResult<()>;

    /// Wraps this repository so every call runs on the blocking pool.
    fn into_async(self) -> AsyncRepository<Self>
    where
        Self: Sized + Clone + Send + 'static,
        Self::Entity: Clone + Send + 'static,
        Self::Id: Send + 'static,
        Self::Update: Clone + Send + 'static,
    {
        AsyncRepository::new(self)
    }
}
