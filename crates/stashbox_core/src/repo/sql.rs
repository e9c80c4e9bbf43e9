//! Column conversion helpers shared by the SQLite repositories.

use super::{RepoError, RepoResult};
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

pub(crate) fn parse_optional_uuid(
    value: Option<String>,
    column: &'static str,
) -> RepoResult<Option<Uuid>> {
    value.map(|value| parse_uuid(&value, column)).transpose()
}

pub(crate) fn parse_bool(value: i64, column: &'static str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}

/// Replaces the nil UUID with a fresh v4 id.
pub(crate) fn assign_id(id: Uuid) -> Uuid {
    if id.is_nil() {
        Uuid::new_v4()
    } else {
        id
    }
}

/// Reads the stored `last_modified` for `id`, if the row exists.
///
/// `table` is always one of the crate's own table names.
pub(crate) fn stored_last_modified(
    conn: &Connection,
    table: &'static str,
    id: Uuid,
) -> RepoResult<Option<i64>> {
    let value = conn
        .query_row(
            &format!("SELECT last_modified FROM {table} WHERE id = ?1;"),
            [id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

pub(crate) fn row_exists(conn: &Connection, table: &'static str, id: Uuid) -> RepoResult<bool> {
    Ok(stored_last_modified(conn, table, id)?.is_some())
}
