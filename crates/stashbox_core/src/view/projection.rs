//! Joins table listings into one recomputed output per commit.

use super::card::CardData;
use crate::aggregate::{
    summarize_boxes, summarize_collections, summarize_inventory, BoxSummary, CollectionSummary,
    InventorySummary,
};
use crate::model::collection::Collection;
use crate::model::item::Item;
use crate::model::storage_box::StorageBox;
use crate::store::{Generation, Store, StreamError, Versioned};
use std::sync::Arc;
use tokio::sync::watch;

/// Latest listing of every table a view depends on.
///
/// Tables the view does not observe stay empty.
#[derive(Debug, Clone, Default)]
pub struct InventorySnapshot {
    pub items: Arc<Vec<Item>>,
    pub boxes: Arc<Vec<StorageBox>>,
    pub collections: Arc<Vec<Collection>>,
}

/// Which tables a view observes and how it projects them.
pub struct ViewDefinition<T> {
    pub name: &'static str,
    pub items: bool,
    pub boxes: bool,
    pub collections: bool,
    pub project: fn(&InventorySnapshot) -> T,
}

impl<T> Clone for ViewDefinition<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ViewDefinition<T> {}

/// Items as stored.
pub fn items_view() -> ViewDefinition<Vec<Item>> {
    ViewDefinition {
        name: "items",
        items: true,
        boxes: false,
        collections: false,
        project: |snapshot| snapshot.items.as_ref().clone(),
    }
}

/// Boxes joined with item roll-ups.
pub fn boxes_view() -> ViewDefinition<Vec<BoxSummary>> {
    ViewDefinition {
        name: "boxes",
        items: true,
        boxes: true,
        collections: false,
        project: |snapshot| summarize_boxes(&snapshot.boxes, &snapshot.items),
    }
}

/// Collections joined with box roll-ups.
pub fn collections_view() -> ViewDefinition<Vec<CollectionSummary>> {
    ViewDefinition {
        name: "collections",
        items: true,
        boxes: true,
        collections: true,
        project: |snapshot| {
            let boxes = summarize_boxes(&snapshot.boxes, &snapshot.items);
            summarize_collections(&snapshot.collections, &boxes)
        },
    }
}

/// Whole-inventory totals.
pub fn summary_view() -> ViewDefinition<InventorySummary> {
    ViewDefinition {
        name: "summary",
        items: true,
        boxes: true,
        collections: true,
        project: |snapshot| {
            summarize_inventory(&snapshot.collections, &snapshot.boxes, &snapshot.items)
        },
    }
}

/// Every card: summary, then collections, boxes, and items.
pub fn cards_view() -> ViewDefinition<Vec<CardData>> {
    ViewDefinition {
        name: "cards",
        items: true,
        boxes: true,
        collections: true,
        project: |snapshot| {
            let boxes = summarize_boxes(&snapshot.boxes, &snapshot.items);
            let collections = summarize_collections(&snapshot.collections, &boxes);
            let summary =
                summarize_inventory(&snapshot.collections, &snapshot.boxes, &snapshot.items);

            let capacity = 1 + collections.len() + boxes.len() + snapshot.items.len();
            let mut cards = Vec::with_capacity(capacity);
            cards.push(CardData::Summary(summary));
            cards.extend(collections.into_iter().map(CardData::Collection));
            cards.extend(boxes.into_iter().map(CardData::Box));
            cards.extend(snapshot.items.iter().cloned().map(CardData::Item));
            cards
        },
    }
}

/// Live subscription for one view definition.
///
/// Every recompute reads all observed tables from the same generation, so a
/// commit that touches several tables is never projected half-applied.
pub(crate) struct Projection<T> {
    definition: ViewDefinition<T>,
    receiver: watch::Receiver<Generation>,
    seen: Option<[u64; 3]>,
}

impl<T> Projection<T> {
    pub(crate) fn subscribe(store: &Store, definition: ViewDefinition<T>) -> Self {
        Self {
            definition,
            receiver: store.generations(),
            seen: None,
        }
    }

    /// Waits until a commit rewrites any observed table, then recomputes.
    ///
    /// Returns `None` once the store is gone.
    pub(crate) async fn next(&mut self) -> Option<Result<T, StreamError>> {
        loop {
            let staged = {
                let generation = self.receiver.borrow_and_update();
                let versions = observed_versions(&self.definition, &generation);
                if self.seen == Some(versions) {
                    None
                } else {
                    self.seen = Some(versions);
                    Some(snapshot_of(&self.definition, &generation))
                }
            };
            if let Some(snapshot) = staged {
                return Some(snapshot.map(|snapshot| (self.definition.project)(&snapshot)));
            }
            self.receiver.changed().await.ok()?;
        }
    }
}

fn observed_versions<T>(definition: &ViewDefinition<T>, generation: &Generation) -> [u64; 3] {
    let version = |observed: bool, version: u64| if observed { version } else { 0 };
    [
        version(definition.items, generation.items.version),
        version(definition.boxes, generation.boxes.version),
        version(definition.collections, generation.collections.version),
    ]
}

fn snapshot_of<T>(
    definition: &ViewDefinition<T>,
    generation: &Generation,
) -> Result<InventorySnapshot, StreamError> {
    Ok(InventorySnapshot {
        items: listing(definition.items, &generation.items)?,
        boxes: listing(definition.boxes, &generation.boxes)?,
        collections: listing(definition.collections, &generation.collections)?,
    })
}

fn listing<R>(observed: bool, slot: &Versioned<R>) -> Result<Arc<Vec<R>>, StreamError> {
    if observed {
        slot.snapshot.clone()
    } else {
        Ok(Arc::new(Vec::new()))
    }
}
