//! SQLite bootstrap for the inventory store.
//!
//! A connection handed out by this module has foreign keys enforced and the
//! schema at [`migrations::latest_version`]. Nothing else in the crate opens
//! SQLite directly.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Why a database could not be opened or written.
#[derive(Debug)]
pub enum DbError {
    /// Statement failure outside of schema migration.
    Sqlite(rusqlite::Error),
    /// Migration script `version` failed; the schema keeps its previous version.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    /// The file was written by a build with a newer schema.
    SchemaTooNew { found: u32, supported: u32 },
}

impl DbError {
    /// Whether retrying with a newer binary could succeed.
    pub fn is_schema_too_new(&self) -> bool {
        matches!(self, Self::SchemaTooNew { .. })
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::Migration { version, source } => {
                write!(f, "schema migration {version} failed: {source}")
            }
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "inventory schema v{found} needs a newer stashbox (this build reads up to v{supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::Migration { source: err, .. } => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
