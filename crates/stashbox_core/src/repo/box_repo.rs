//! Box repository over the `boxes` table.
//!
//! Removing a box detaches its items instead of deleting them, so every
//! destructive call here republishes `items` too.

use super::sql::{assign_id, parse_optional_uuid, parse_uuid, row_exists, stored_last_modified};
use super::{RepoError, RepoResult, Repository};
use crate::model::collection::CollectionId;
use crate::model::storage_box::{BoxId, BoxUpdate, StorageBox};
use crate::model::{next_modified, now_epoch_ms};
use crate::store::{Generation, Store, Table, TableRecord, TableStream, Versioned};
use log::debug;
use rusqlite::{params, Connection, Row};

const BOX_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    last_modified,
    collection_id
FROM boxes";

const BOX_ORDER_SQL: &str = "ORDER BY last_modified DESC, id ASC";

/// SQLite-backed box repository.
#[derive(Clone)]
pub struct SqliteBoxRepository {
    store: Store,
}

impl SqliteBoxRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Lists boxes inside `collection_id`, or orphan boxes when `None`.
    pub fn list_by_collection(
        &self,
        collection_id: Option<CollectionId>,
    ) -> RepoResult<Vec<StorageBox>> {
        self.store.read(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{BOX_SELECT_SQL} WHERE collection_id IS ?1 {BOX_ORDER_SQL};"
            ))?;
            let mut rows = stmt.query([collection_id.map(|id| id.to_string())])?;
            let mut boxes = Vec::new();
            while let Some(row) = rows.next()? {
                boxes.push(parse_box_row(row)?);
            }
            Ok(boxes)
        })
    }
}

impl Repository for SqliteBoxRepository {
    type Entity = StorageBox;
    type Id = BoxId;
    type Update = BoxUpdate;

    fn observe_all(&self) -> TableStream<StorageBox> {
        self.store.observe::<StorageBox>()
    }

    fn list_all(&self) -> RepoResult<Vec<StorageBox>> {
        self.store.read(StorageBox::load_all)
    }

    fn get(&self, id: BoxId) -> RepoResult<Option<StorageBox>> {
        self.store.read(|conn| load_box(conn, id))
    }

    fn insert_all(&self, boxes: &[StorageBox]) -> RepoResult<Vec<StorageBox>> {
        self.store.write("insert_boxes", &[Table::Boxes], |tx| {
            let mut stored = Vec::with_capacity(boxes.len());
            for storage_box in boxes {
                storage_box.validate()?;
                let mut storage_box = storage_box.clone();
                storage_box.id = assign_id(storage_box.id);
                storage_box.last_modified =
                    next_modified(stored_last_modified(tx, "boxes", storage_box.id)?);
                upsert_box(tx, &storage_box)?;
                stored.push(storage_box);
            }
            Ok(stored)
        })
    }

    fn update(&self, update: &BoxUpdate) -> RepoResult<StorageBox> {
        self.store.write("update_box", &[Table::Boxes], |tx| {
            let mut storage_box = load_box(tx, update.id)?.ok_or(RepoError::NotFound {
                table: Table::Boxes,
                id: update.id,
            })?;
            update.apply_to(&mut storage_box);
            storage_box.validate()?;
            upsert_box(tx, &storage_box)?;
            Ok(storage_box)
        })
    }

    fn delete(&self, id: BoxId) -> RepoResult<()> {
        if !self.store.read(|conn| row_exists(conn, "boxes", id))? {
            debug!("event=box_delete module=repo status=skipped reason=not_found id={id}");
            return Ok(());
        }
        self.store
            .write("delete_box", &[Table::Boxes, Table::Items], |tx| {
                let orphaned = tx.execute(
                    "UPDATE items
                     SET box_id = NULL,
                         last_modified = MAX(?2, last_modified + 1)
                     WHERE box_id = ?1;",
                    params![id.to_string(), now_epoch_ms()],
                )?;
                tx.execute("DELETE FROM boxes WHERE id = ?1;", [id.to_string()])?;
                Ok(orphaned)
            })
            .map(|orphaned| {
                debug!("event=box_delete module=repo status=ok id={id} orphaned_items={orphaned}");
            })
    }

    fn clear(&self) -> RepoResult<()> {
        self.store
            .write("clear_boxes", &[Table::Boxes, Table::Items], |tx| {
                tx.execute(
                    "UPDATE items
                     SET box_id = NULL,
                         last_modified = MAX(?1, last_modified + 1)
                     WHERE box_id IS NOT NULL;",
                    [now_epoch_ms()],
                )?;
                tx.execute("DELETE FROM boxes;", [])?;
                Ok(())
            })
    }
}

impl TableRecord for StorageBox {
    const TABLE: Table = Table::Boxes;

    fn load_all(conn: &Connection) -> RepoResult<Vec<Self>> {
        let mut stmt = conn.prepare(&format!("{BOX_SELECT_SQL} {BOX_ORDER_SQL};"))?;
        let mut rows = stmt.query([])?;
        let mut boxes = Vec::new();
        while let Some(row) = rows.next()? {
            boxes.push(parse_box_row(row)?);
        }
        Ok(boxes)
    }

    fn slot(generation: &Generation) -> &Versioned<Self> {
        &generation.boxes
    }

    fn slot_mut(generation: &mut Generation) -> &mut Versioned<Self> {
        &mut generation.boxes
    }
}

fn load_box(conn: &Connection, id: BoxId) -> RepoResult<Option<StorageBox>> {
    let mut stmt = conn.prepare(&format!("{BOX_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_box_row(row)?));
    }
    Ok(None)
}

fn upsert_box(conn: &Connection, storage_box: &StorageBox) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO boxes (
            id,
            name,
            description,
            last_modified,
            collection_id
        ) VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            description = excluded.description,
            last_modified = excluded.last_modified,
            collection_id = excluded.collection_id;",
        params![
            storage_box.id.to_string(),
            storage_box.name.as_str(),
            storage_box.description.as_deref(),
            storage_box.last_modified,
            storage_box.collection_id.map(|id| id.to_string()),
        ],
    )?;
    Ok(())
}

fn parse_box_row(row: &Row<'_>) -> RepoResult<StorageBox> {
    let id_text: String = row.get("id")?;
    Ok(StorageBox {
        id: parse_uuid(&id_text, "boxes.id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        last_modified: row.get("last_modified")?,
        collection_id: parse_optional_uuid(row.get("collection_id")?, "boxes.collection_id")?,
    })
}
