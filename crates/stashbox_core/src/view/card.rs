//! Display payloads shared by every card in the inventory views.

use crate::aggregate::{BoxSummary, CollectionSummary, InventorySummary};
use crate::model::item::Item;
use crate::model::Money;
use serde::Serialize;

/// Discriminant of [`CardData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Item,
    Box,
    Collection,
    Summary,
}

/// One card, carrying the typed payload of its hierarchy level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum CardData {
    Item(Item),
    Box(BoxSummary),
    Collection(CollectionSummary),
    Summary(InventorySummary),
}

impl CardData {
    pub fn kind(&self) -> CardKind {
        match self {
            Self::Item(_) => CardKind::Item,
            Self::Box(_) => CardKind::Box,
            Self::Collection(_) => CardKind::Collection,
            Self::Summary(_) => CardKind::Summary,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Item(item) => &item.name,
            Self::Box(summary) => &summary.storage_box.name,
            Self::Collection(summary) => &summary.collection.name,
            Self::Summary(_) => "Inventory",
        }
    }

    /// Secondary line: the description, or a count for derived cards.
    pub fn subtitle(&self) -> Option<String> {
        match self {
            Self::Item(item) => item.description.clone(),
            Self::Box(summary) => Some(
                summary
                    .storage_box
                    .description
                    .clone()
                    .unwrap_or_else(|| count_label(summary.item_count, "item")),
            ),
            Self::Collection(summary) => Some(
                summary
                    .collection
                    .description
                    .clone()
                    .unwrap_or_else(|| count_label(summary.box_count, "box")),
            ),
            Self::Summary(summary) => Some(format!(
                "{} in {}",
                count_label(summary.item_count, "item"),
                count_label(summary.box_count, "box")
            )),
        }
    }

    pub fn value(&self) -> Money {
        match self {
            Self::Item(item) => item.value,
            Self::Box(summary) => summary.value,
            Self::Collection(summary) => summary.value,
            Self::Summary(summary) => summary.total_value,
        }
    }

    pub fn is_fragile(&self) -> bool {
        match self {
            Self::Item(item) => item.is_fragile,
            Self::Box(summary) => summary.is_fragile,
            Self::Collection(summary) => summary.is_fragile,
            Self::Summary(summary) => summary.fragile_item_count > 0,
        }
    }

    pub fn last_modified(&self) -> Option<i64> {
        match self {
            Self::Item(item) => Some(item.last_modified),
            Self::Box(summary) => Some(summary.storage_box.last_modified),
            Self::Collection(summary) => Some(summary.collection.last_modified),
            Self::Summary(summary) => summary.last_modified,
        }
    }

    pub fn image_ref(&self) -> Option<&str> {
        match self {
            Self::Item(item) => item.image_ref.as_deref(),
            Self::Box(_) | Self::Collection(_) | Self::Summary(_) => None,
        }
    }
}

fn count_label(count: usize, noun: &str) -> String {
    match (count, noun) {
        (1, _) => format!("1 {noun}"),
        (_, "box") => format!("{count} boxes"),
        _ => format!("{count} {noun}s"),
    }
}
