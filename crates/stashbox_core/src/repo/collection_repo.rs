//! Collection repository over the `collections` table.

use super::sql::{assign_id, parse_uuid, row_exists, stored_last_modified};
use super::{RepoError, RepoResult, Repository};
use crate::model::collection::{Collection, CollectionId, CollectionUpdate};
use crate::model::{next_modified, now_epoch_ms};
use crate::store::{Generation, Store, Table, TableRecord, TableStream, Versioned};
use log::debug;
use rusqlite::{params, Connection, Row};

const COLLECTION_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    last_modified
FROM collections";

const COLLECTION_ORDER_SQL: &str = "ORDER BY last_modified DESC, id ASC";

/// SQLite-backed collection repository.
#[derive(Clone)]
pub struct SqliteCollectionRepository {
    store: Store,
}

impl SqliteCollectionRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

impl Repository for SqliteCollectionRepository {
    type Entity = Collection;
    type Id = CollectionId;
    type Update = CollectionUpdate;

    fn observe_all(&self) -> TableStream<Collection> {
        self.store.observe::<Collection>()
    }

    fn list_all(&self) -> RepoResult<Vec<Collection>> {
        self.store.read(Collection::load_all)
    }

    fn get(&self, id: CollectionId) -> RepoResult<Option<Collection>> {
        self.store.read(|conn| load_collection(conn, id))
    }

    fn insert_all(&self, collections: &[Collection]) -> RepoResult<Vec<Collection>> {
        self.store
            .write("insert_collections", &[Table::Collections], |tx| {
                let mut stored = Vec::with_capacity(collections.len());
                for collection in collections {
                    collection.validate()?;
                    let mut collection = collection.clone();
                    collection.id = assign_id(collection.id);
                    collection.last_modified =
                        next_modified(stored_last_modified(tx, "collections", collection.id)?);
                    upsert_collection(tx, &collection)?;
                    stored.push(collection);
                }
                Ok(stored)
            })
    }

    fn update(&self, update: &CollectionUpdate) -> RepoResult<Collection> {
        self.store
            .write("update_collection", &[Table::Collections], |tx| {
                let mut collection =
                    load_collection(tx, update.id)?.ok_or(RepoError::NotFound {
                        table: Table::Collections,
                        id: update.id,
                    })?;
                update.apply_to(&mut collection);
                collection.validate()?;
                upsert_collection(tx, &collection)?;
                Ok(collection)
            })
    }

    fn delete(&self, id: CollectionId) -> RepoResult<()> {
        if !self.store.read(|conn| row_exists(conn, "collections", id))? {
            debug!("event=collection_delete module=repo status=skipped reason=not_found id={id}");
            return Ok(());
        }
        self.store.write(
            "delete_collection",
            &[Table::Collections, Table::Boxes],
            |tx| {
                tx.execute(
                    "UPDATE boxes
                     SET collection_id = NULL,
                         last_modified = MAX(?2, last_modified + 1)
                     WHERE collection_id = ?1;",
                    params![id.to_string(), now_epoch_ms()],
                )?;
                tx.execute("DELETE FROM collections WHERE id = ?1;", [id.to_string()])?;
                Ok(())
            },
        )
    }

    fn clear(&self) -> RepoResult<()> {
        self.store.write(
            "clear_collections",
            &[Table::Collections, Table::Boxes],
            |tx| {
                tx.execute(
                    "UPDATE boxes
                     SET collection_id = NULL,
                         last_modified = MAX(?1, last_modified + 1)
                     WHERE collection_id IS NOT NULL;",
                    [now_epoch_ms()],
                )?;
                tx.execute("DELETE FROM collections;", [])?;
                Ok(())
            },
        )
    }
}

impl TableRecord for Collection {
    const TABLE: Table = Table::Collections;

    fn load_all(conn: &Connection) -> RepoResult<Vec<Self>> {
        let mut stmt = conn.prepare(&format!(
            "{COLLECTION_SELECT_SQL} {COLLECTION_ORDER_SQL};"
        ))?;
        let mut rows = stmt.query([])?;
        let mut collections = Vec::new();
        while let Some(row) = rows.next()? {
            collections.push(parse_collection_row(row)?);
        }
        Ok(collections)
    }

    fn slot(generation: &Generation) -> &Versioned<Self> {
        &generation.collections
    }

    fn slot_mut(generation: &mut Generation) -> &mut Versioned<Self> {
        &mut generation.collections
    }
}

fn load_collection(conn: &Connection, id: CollectionId) -> RepoResult<Option<Collection>> {
    let mut stmt = conn.prepare(&format!("{COLLECTION_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_collection_row(row)?));
    }
    Ok(None)
}

fn upsert_collection(conn: &Connection, collection: &Collection) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO collections (
            id,
            name,
            description,
            last_modified
        ) VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            description = excluded.description,
            last_modified = excluded.last_modified;",
        params![
            collection.id.to_string(),
            collection.name.as_str(),
            collection.description.as_deref(),
            collection.last_modified,
        ],
    )?;
    Ok(())
}

fn parse_collection_row(row: &Row<'_>) -> RepoResult<Collection> {
    let id_text: String = row.get("id")?;
    Ok(Collection {
        id: parse_uuid(&id_text, "collections.id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        last_modified: row.get("last_modified")?,
    })
}
