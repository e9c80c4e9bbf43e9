//! Item repository over the `items` table.

use super::sql::{
    assign_id, bool_to_int, parse_bool, parse_optional_uuid, parse_uuid, row_exists,
    stored_last_modified,
};
use super::{RepoError, RepoResult, Repository};
use crate::model::item::{Item, ItemId, ItemUpdate};
use crate::model::storage_box::BoxId;
use crate::model::{next_modified, Money};
use crate::store::{Generation, Store, Table, TableRecord, TableStream, Versioned};
use log::debug;
use rusqlite::{params, Connection, Row};

const ITEM_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    image_ref,
    value,
    is_fragile,
    last_modified,
    box_id
FROM items";

const ITEM_ORDER_SQL: &str = "ORDER BY last_modified DESC, id ASC";

/// SQLite-backed item repository.
#[derive(Clone)]
pub struct SqliteItemRepository {
    store: Store,
}

impl SqliteItemRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Lists items inside `box_id`, or orphan items when `None`.
    pub fn list_by_box(&self, box_id: Option<BoxId>) -> RepoResult<Vec<Item>> {
        self.store.read(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{ITEM_SELECT_SQL} WHERE box_id IS ?1 {ITEM_ORDER_SQL};"
            ))?;
            let mut rows = stmt.query([box_id.map(|id| id.to_string())])?;
            let mut items = Vec::new();
            while let Some(row) = rows.next()? {
                items.push(parse_item_row(row)?);
            }
            Ok(items)
        })
    }
}

impl Repository for SqliteItemRepository {
    type Entity = Item;
    type Id = ItemId;
    type Update = ItemUpdate;

    fn observe_all(&self) -> TableStream<Item> {
        self.store.observe::<Item>()
    }

    fn list_all(&self) -> RepoResult<Vec<Item>> {
        self.store.read(Item::load_all)
    }

    fn get(&self, id: ItemId) -> RepoResult<Option<Item>> {
        self.store.read(|conn| load_item(conn, id))
    }

    fn insert_all(&self, items: &[Item]) -> RepoResult<Vec<Item>> {
        self.store.write("insert_items", &[Table::Items], |tx| {
            let mut stored = Vec::with_capacity(items.len());
            for item in items {
                item.validate()?;
                let mut item = item.clone();
                item.id = assign_id(item.id);
                item.last_modified =
                    next_modified(stored_last_modified(tx, "items", item.id)?);
                upsert_item(tx, &item)?;
                stored.push(item);
            }
            debug!(
                "event=items_insert module=repo status=ok count={}",
                stored.len()
            );
            Ok(stored)
        })
    }

    fn update(&self, update: &ItemUpdate) -> RepoResult<Item> {
        self.store.write("update_item", &[Table::Items], |tx| {
            let mut item = load_item(tx, update.id)?.ok_or(RepoError::NotFound {
                table: Table::Items,
                id: update.id,
            })?;
            update.apply_to(&mut item);
            item.validate()?;
            upsert_item(tx, &item)?;
            Ok(item)
        })
    }

    fn delete(&self, id: ItemId) -> RepoResult<()> {
        if !self.store.read(|conn| row_exists(conn, "items", id))? {
            debug!("event=item_delete module=repo status=skipped reason=not_found id={id}");
            return Ok(());
        }
        self.store.write("delete_item", &[Table::Items], |tx| {
            tx.execute("DELETE FROM items WHERE id = ?1;", [id.to_string()])?;
            Ok(())
        })
    }

    fn clear(&self) -> RepoResult<()> {
        self.store.write("clear_items", &[Table::Items], |tx| {
            tx.execute("DELETE FROM items;", [])?;
            Ok(())
        })
    }
}

impl TableRecord for Item {
    const TABLE: Table = Table::Items;

    fn load_all(conn: &Connection) -> RepoResult<Vec<Self>> {
        let mut stmt = conn.prepare(&format!("{ITEM_SELECT_SQL} {ITEM_ORDER_SQL};"))?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }
        Ok(items)
    }

    fn slot(generation: &Generation) -> &Versioned<Self> {
        &generation.items
    }

    fn slot_mut(generation: &mut Generation) -> &mut Versioned<Self> {
        &mut generation.items
    }
}

fn load_item(conn: &Connection, id: ItemId) -> RepoResult<Option<Item>> {
    let mut stmt = conn.prepare(&format!("{ITEM_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_item_row(row)?));
    }
    Ok(None)
}

fn upsert_item(conn: &Connection, item: &Item) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO items (
            id,
            name,
            description,
            image_ref,
            value,
            is_fragile,
            last_modified,
            box_id
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            description = excluded.description,
            image_ref = excluded.image_ref,
            value = excluded.value,
            is_fragile = excluded.is_fragile,
            last_modified = excluded.last_modified,
            box_id = excluded.box_id;",
        params![
            item.id.to_string(),
            item.name.as_str(),
            item.description.as_deref(),
            item.image_ref.as_deref(),
            item.value.cents(),
            bool_to_int(item.is_fragile),
            item.last_modified,
            item.box_id.map(|id| id.to_string()),
        ],
    )?;
    Ok(())
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<Item> {
    let id_text: String = row.get("id")?;
    let item = Item {
        id: parse_uuid(&id_text, "items.id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        is_fragile: parse_bool(row.get("is_fragile")?, "items.is_fragile")?,
        value: Money::from_cents(row.get("value")?),
        image_ref: row.get("image_ref")?,
        last_modified: row.get("last_modified")?,
        box_id: parse_optional_uuid(row.get("box_id")?, "items.box_id")?,
    };
    item.validate()
        .map_err(|err| RepoError::InvalidData(format!("item {id_text}: {err}")))?;
    Ok(item)
}
