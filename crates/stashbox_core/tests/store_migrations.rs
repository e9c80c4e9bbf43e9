use stashbox_core::db::migrations::latest_version;
use stashbox_core::db::{open_db, open_db_in_memory, DbError};
use stashbox_core::{Item, Money, Repository, Store};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "items");
    assert_table_exists(&conn, "boxes");
    assert_table_exists(&conn, "collections");
}

#[test]
fn schema_has_no_stored_rollup_columns() {
    let conn = open_db_in_memory().unwrap();

    let box_columns = table_columns(&conn, "boxes");
    assert_eq!(
        box_columns,
        vec!["id", "name", "description", "last_modified", "collection_id"]
    );
    let collection_columns = table_columns(&conn, "collections");
    assert!(!collection_columns.contains(&"value".to_string()));
    assert!(!collection_columns.contains(&"is_fragile".to_string()));
}

#[test]
fn reopening_file_store_keeps_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stashbox.sqlite3");

    let stored = {
        let store = Store::open(&path).unwrap();
        store
            .items()
            .insert(&Item::new("Globe", Money::from_units(18, 0)))
            .unwrap()
    };

    let reopened = Store::open(&path).unwrap();
    assert_eq!(reopened.items().get(stored.id).unwrap(), Some(stored));
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    assert!(err.is_schema_too_new());
    match err {
        DbError::SchemaTooNew { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table});"))
        .unwrap();
    let mut rows = stmt.query([]).unwrap();
    let mut columns = Vec::new();
    while let Some(row) = rows.next().unwrap() {
        columns.push(row.get::<_, String>(1).unwrap());
    }
    columns
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
