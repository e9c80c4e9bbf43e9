//! Ordered schema scripts, tracked through `PRAGMA user_version`.
//!
//! # Invariants
//! - Script versions are strictly increasing.
//! - All pending scripts run in one transaction; a failure leaves the
//!   stored version untouched.

use crate::db::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_init.sql"),
}];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    latest_of(MIGRATIONS)
}

/// Brings the schema on `conn` up to [`latest_version`].
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    apply(conn, MIGRATIONS)
}

fn latest_of(migrations: &[Migration]) -> u32 {
    migrations.last().map_or(0, |migration| migration.version)
}

fn apply(conn: &mut Connection, migrations: &[Migration]) -> DbResult<()> {
    let found: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let supported = latest_of(migrations);

    if found > supported {
        return Err(DbError::SchemaTooNew { found, supported });
    }
    if found == supported {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in migrations.iter().filter(|m| m.version > found) {
        let version = migration.version;
        tx.execute_batch(migration.sql)
            .and_then(|()| tx.pragma_update(None, "user_version", version))
            .map_err(|source| {
                error!("event=db_migrate module=db status=error version={version} error={source}");
                DbError::Migration { version, source }
            })?;
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={found} to_version={supported}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{apply, Migration};
    use crate::db::DbError;
    use rusqlite::Connection;

    fn user_version(conn: &Connection) -> u32 {
        conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn failing_script_reports_its_version_and_rolls_back() {
        let mut conn = Connection::open_in_memory().unwrap();
        let scripts = [
            Migration {
                version: 1,
                sql: "CREATE TABLE shelves (id TEXT PRIMARY KEY);",
            },
            Migration {
                version: 2,
                sql: "CREATE TABLE broken (",
            },
        ];

        let err = apply(&mut conn, &scripts).unwrap_err();

        assert!(matches!(err, DbError::Migration { version: 2, .. }));
        assert_eq!(user_version(&conn), 0);
        let shelves: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE name = 'shelves';",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(shelves, 0);
    }

    #[test]
    fn up_to_date_schema_is_left_alone() {
        let mut conn = Connection::open_in_memory().unwrap();
        let scripts = [Migration {
            version: 1,
            sql: "CREATE TABLE shelves (id TEXT PRIMARY KEY);",
        }];

        apply(&mut conn, &scripts).unwrap();
        apply(&mut conn, &scripts).unwrap();

        assert_eq!(user_version(&conn), 1);
    }
}
