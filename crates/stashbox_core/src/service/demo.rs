//! Canonical demo dataset.
//!
//! Ids are fixed so every demo session starts from byte-identical records.

use crate::model::collection::{Collection, CollectionId};
use crate::model::item::Item;
use crate::model::storage_box::{BoxId, StorageBox};
use crate::model::Money;
use crate::repo::{RepoResult, Repository};
use crate::store::Store;
use log::info;
use uuid::Uuid;

pub const LIVING_ROOM: CollectionId = Uuid::from_u128(0x5354_4153_4842_0001_0000_0000_0000_0001);
pub const GARAGE: CollectionId = Uuid::from_u128(0x5354_4153_4842_0001_0000_0000_0000_0002);

pub const BOOKSHELF_BOX: BoxId = Uuid::from_u128(0x5354_4153_4842_0002_0000_0000_0000_0001);
pub const KITCHENWARE_BOX: BoxId = Uuid::from_u128(0x5354_4153_4842_0002_0000_0000_0000_0002);
pub const TOOLS_BOX: BoxId = Uuid::from_u128(0x5354_4153_4842_0002_0000_0000_0000_0003);

fn item_id(n: u128) -> Uuid {
    Uuid::from_u128(0x5354_4153_4842_0003_0000_0000_0000_0000 | n)
}

pub fn demo_collections() -> Vec<Collection> {
    vec![
        Collection::with_id(LIVING_ROOM, "Living Room")
            .described("Books, dishes and keepsakes"),
        Collection::with_id(GARAGE, "Garage"),
    ]
}

pub fn demo_boxes() -> Vec<StorageBox> {
    vec![
        StorageBox::with_id(BOOKSHELF_BOX, "Bookshelf").in_collection(LIVING_ROOM),
        StorageBox::with_id(KITCHENWARE_BOX, "Kitchenware")
            .in_collection(LIVING_ROOM)
            .described("Handle with care"),
        StorageBox::with_id(TOOLS_BOX, "Tools").in_collection(GARAGE),
    ]
}

/// Six boxed items plus one orphan (`Desk Lamp`).
pub fn demo_items() -> Vec<Item> {
    vec![
        Item::with_id(item_id(1), "Hardcover Atlas", Money::from_units(45, 0))
            .in_box(BOOKSHELF_BOX),
        Item::with_id(item_id(2), "Photo Album", Money::from_units(30, 0))
            .in_box(BOOKSHELF_BOX),
        Item::with_id(item_id(3), "Porcelain Teapot", Money::from_units(60, 0))
            .fragile(true)
            .in_box(KITCHENWARE_BOX),
        Item::with_id(item_id(4), "Wine Glasses", Money::from_units(40, 0))
            .fragile(true)
            .described("Set of four")
            .in_box(KITCHENWARE_BOX),
        Item::with_id(item_id(5), "Cordless Drill", Money::from_units(120, 0))
            .in_box(TOOLS_BOX),
        Item::with_id(item_id(6), "Socket Set", Money::from_units(75, 50)).in_box(TOOLS_BOX),
        Item::with_id(item_id(7), "Desk Lamp", Money::from_units(25, 0)),
    ]
}

/// Removes every record, children first.
pub fn reset(store: &Store) -> RepoResult<()> {
    store.items().clear()?;
    store.boxes().clear()?;
    store.collections().clear()?;
    info!("event=demo_reset module=service status=ok");
    Ok(())
}

/// Inserts the demo dataset, parents first so foreign keys resolve.
pub fn seed_demo_data(store: &Store) -> RepoResult<()> {
    let collections = store.collections().insert_all(&demo_collections())?;
    let boxes = store.boxes().insert_all(&demo_boxes())?;
    let items = store.items().insert_all(&demo_items())?;
    info!(
        "event=demo_seed module=service status=ok collections={} boxes={} items={}",
        collections.len(),
        boxes.len(),
        items.len()
    );
    Ok(())
}
