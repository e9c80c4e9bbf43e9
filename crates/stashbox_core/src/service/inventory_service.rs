//! Inventory use-case service.
//!
//! # Invariants
//! - Roll-ups are computed from one consistent read of all tables.
//! - Moves go through repository updates, so subscribers see them.

use crate::aggregate::{
    summarize_box, summarize_boxes, summarize_collection, summarize_collections,
    summarize_inventory, BoxSummary, CollectionSummary, InventorySummary,
};
use crate::model::collection::{Collection, CollectionId};
use crate::model::item::{Item, ItemId, ItemUpdate};
use crate::model::storage_box::{BoxId, BoxUpdate, StorageBox};
use crate::repo::{RepoResult, Repository};
use crate::store::{Store, TableRecord};

/// Full hierarchy with every derived field resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryOverview {
    pub summary: InventorySummary,
    pub collections: Vec<CollectionSummary>,
    pub boxes: Vec<BoxSummary>,
    pub items: Vec<Item>,
}

impl InventoryOverview {
    /// Items that belong to no box.
    pub fn orphan_items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|item| item.is_orphan())
    }

    /// Boxes that belong to no collection.
    pub fn orphan_boxes(&self) -> impl Iterator<Item = &BoxSummary> {
        self.boxes
            .iter()
            .filter(|summary| summary.storage_box.is_orphan())
    }
}

/// Use-case facade over the three repositories.
#[derive(Clone)]
pub struct InventoryService {
    store: Store,
}

impl InventoryService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Reads every table under one lock and resolves all roll-ups.
    pub fn overview(&self) -> RepoResult<InventoryOverview> {
        let (collections, boxes, items) = self.store.read(|conn| {
            Ok((
                Collection::load_all(conn)?,
                StorageBox::load_all(conn)?,
                Item::load_all(conn)?,
            ))
        })?;

        let box_summaries = summarize_boxes(&boxes, &items);
        Ok(InventoryOverview {
            summary: summarize_inventory(&collections, &boxes, &items),
            collections: summarize_collections(&collections, &box_summaries),
            boxes: box_summaries,
            items,
        })
    }

    /// Derived value and fragility of one box, or `None` if it is not stored.
    pub fn box_summary(&self, box_id: BoxId) -> RepoResult<Option<BoxSummary>> {
        let Some(storage_box) = self.store.boxes().get(box_id)? else {
            return Ok(None);
        };
        let items = self.store.items().list_by_box(Some(box_id))?;
        Ok(Some(summarize_box(&storage_box, &items)))
    }

    /// Derived value and fragility of one collection, folded from its boxes.
    pub fn collection_summary(
        &self,
        collection_id: CollectionId,
    ) -> RepoResult<Option<CollectionSummary>> {
        let Some(collection) = self.store.collections().get(collection_id)? else {
            return Ok(None);
        };
        let boxes = self
            .store
            .boxes()
            .list_by_collection(Some(collection_id))?;
        let items = self.store.items().list_all()?;
        let box_summaries = summarize_boxes(&boxes, &items);
        Ok(Some(summarize_collection(&collection, &box_summaries)))
    }

    /// Puts an item into `box_id`, or detaches it with `None`.
    pub fn move_item(&self, item_id: ItemId, box_id: Option<BoxId>) -> RepoResult<Item> {
        self.store
            .items()
            .update(&ItemUpdate::new(item_id).box_id(box_id))
    }

    /// Puts a box into `collection_id`, or detaches it with `None`.
    pub fn move_box(
        &self,
        box_id: BoxId,
        collection_id: Option<CollectionId>,
    ) -> RepoResult<StorageBox> {
        self.store
            .boxes()
            .update(&BoxUpdate::new(box_id).collection_id(collection_id))
    }
}
