//! Bottom-up roll-ups across the collection -> box -> item hierarchy.
//!
//! # Responsibility
//! - Derive box value/fragility from items, and collection value/fragility
//!   from box summaries.
//! - Derive whole-inventory totals for the summary card.
//!
//! # Invariants
//! - Pure functions: no I/O, no stored state, inputs are never mutated.
//! - Empty child sets roll up to `value = 0` and `is_fragile = false`.
//! - Collection totals fold box totals; they never re-walk items directly.
//! - Every call is a full recompute; there is no incremental path.

use crate::model::collection::{Collection, CollectionId};
use crate::model::item::Item;
use crate::model::storage_box::{BoxId, StorageBox};
use crate::model::Money;
use serde::Serialize;
use std::collections::HashMap;

/// Derived value and fragility of one node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Rollup {
    pub value: Money,
    pub is_fragile: bool,
}

impl Rollup {
    /// Folds child roll-ups: sum of values, OR of fragility.
    pub fn fold(children: impl IntoIterator<Item = Rollup>) -> Self {
        children
            .into_iter()
            .fold(Rollup::default(), |acc, child| Rollup {
                value: acc.value + child.value,
                is_fragile: acc.is_fragile || child.is_fragile,
            })
    }
}

impl From<&Item> for Rollup {
    fn from(item: &Item) -> Self {
        Self {
            value: item.value,
            is_fragile: item.is_fragile,
        }
    }
}

/// Box record joined with the roll-up of its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoxSummary {
    pub storage_box: StorageBox,
    pub item_count: usize,
    pub value: Money,
    pub is_fragile: bool,
}

impl BoxSummary {
    pub fn rollup(&self) -> Rollup {
        Rollup {
            value: self.value,
            is_fragile: self.is_fragile,
        }
    }
}

/// Collection record joined with the roll-up of its boxes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionSummary {
    pub collection: Collection,
    pub box_count: usize,
    pub item_count: usize,
    pub value: Money,
    pub is_fragile: bool,
}

/// Totals over the whole inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InventorySummary {
    pub collection_count: usize,
    pub box_count: usize,
    pub item_count: usize,
    pub fragile_item_count: usize,
    /// Items with no box.
    pub orphan_item_count: usize,
    /// Boxes with no collection.
    pub orphan_box_count: usize,
    pub total_value: Money,
    /// Newest `last_modified` over every record, `None` when empty.
    pub last_modified: Option<i64>,
}

/// Rolls up one box from the items it currently contains.
pub fn summarize_box<'a>(
    storage_box: &StorageBox,
    items: impl IntoIterator<Item = &'a Item>,
) -> BoxSummary {
    let mut item_count = 0;
    let rollup = Rollup::fold(items.into_iter().map(|item| {
        item_count += 1;
        Rollup::from(item)
    }));
    BoxSummary {
        storage_box: storage_box.clone(),
        item_count,
        value: rollup.value,
        is_fragile: rollup.is_fragile,
    }
}

/// Rolls up one collection from the summaries of the boxes it contains.
pub fn summarize_collection<'a>(
    collection: &Collection,
    boxes: impl IntoIterator<Item = &'a BoxSummary>,
) -> CollectionSummary {
    let mut box_count = 0;
    let mut item_count = 0;
    let rollup = Rollup::fold(boxes.into_iter().map(|summary| {
        box_count += 1;
        item_count += summary.item_count;
        summary.rollup()
    }));
    CollectionSummary {
        collection: collection.clone(),
        box_count,
        item_count,
        value: rollup.value,
        is_fragile: rollup.is_fragile,
    }
}

/// Summarizes every box against a full item listing, preserving box order.
///
/// Items pointing at boxes not present in `boxes` are ignored.
pub fn summarize_boxes(boxes: &[StorageBox], items: &[Item]) -> Vec<BoxSummary> {
    let mut by_box: HashMap<BoxId, Vec<&Item>> = HashMap::new();
    for item in items {
        if let Some(box_id) = item.box_id {
            by_box.entry(box_id).or_default().push(item);
        }
    }

    boxes
        .iter()
        .map(|storage_box| {
            let contents = by_box.remove(&storage_box.id).unwrap_or_default();
            summarize_box(storage_box, contents)
        })
        .collect()
}

/// Summarizes every collection against box summaries, preserving order.
pub fn summarize_collections(
    collections: &[Collection],
    boxes: &[BoxSummary],
) -> Vec<CollectionSummary> {
    let mut by_collection: HashMap<CollectionId, Vec<&BoxSummary>> = HashMap::new();
    for summary in boxes {
        if let Some(collection_id) = summary.storage_box.collection_id {
            by_collection.entry(collection_id).or_default().push(summary);
        }
    }

    collections
        .iter()
        .map(|collection| {
            let contents = by_collection.remove(&collection.id).unwrap_or_default();
            summarize_collection(collection, contents)
        })
        .collect()
}

/// Totals across every level, counting orphans too.
pub fn summarize_inventory(
    collections: &[Collection],
    boxes: &[StorageBox],
    items: &[Item],
) -> InventorySummary {
    let last_modified = collections
        .iter()
        .map(|collection| collection.last_modified)
        .chain(boxes.iter().map(|storage_box| storage_box.last_modified))
        .chain(items.iter().map(|item| item.last_modified))
        .max();

    InventorySummary {
        collection_count: collections.len(),
        box_count: boxes.len(),
        item_count: items.len(),
        fragile_item_count: items.iter().filter(|item| item.is_fragile).count(),
        orphan_item_count: items.iter().filter(|item| item.is_orphan()).count(),
        orphan_box_count: boxes.iter().filter(|storage_box| storage_box.is_orphan()).count(),
        total_value: items.iter().map(|item| item.value).sum(),
        last_modified,
    }
}
