//! Item domain model: the leaf of the inventory hierarchy.
//!
//! # Invariants
//! - `value` is never negative once persisted.
//! - `box_id = None` marks an orphan item; this is a valid state.

use super::storage_box::BoxId;
use super::{next_modified, now_epoch_ms, validate_name, Money, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one item.
pub type ItemId = Uuid;

/// One physical belonging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: Option<String>,
    pub is_fragile: bool,
    pub value: Money,
    /// Opaque reference to a captured photo, if any.
    pub image_ref: Option<String>,
    /// Unix epoch milliseconds of the last create/update.
    pub last_modified: i64,
    /// Owning box. `None` while unassigned.
    pub box_id: Option<BoxId>,
}

impl Item {
    /// Creates an unassigned, non-fragile item with a generated ID.
    pub fn new(name: impl Into<String>, value: Money) -> Self {
        Self::with_id(Uuid::new_v4(), name, value)
    }

    /// Creates an item with a caller-provided ID.
    ///
    /// Passing `Uuid::nil()` leaves ID assignment to the repository insert.
    pub fn with_id(id: ItemId, name: impl Into<String>, value: Money) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            is_fragile: false,
            value,
            image_ref: None,
            last_modified: now_epoch_ms(),
            box_id: None,
        }
    }

    pub fn fragile(mut self, is_fragile: bool) -> Self {
        self.is_fragile = is_fragile;
        self
    }

    pub fn in_box(mut self, box_id: BoxId) -> Self {
        self.box_id = Some(box_id);
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether this item belongs to no box.
    pub fn is_orphan(&self) -> bool {
        self.box_id.is_none()
    }

    /// Checks write-time invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name, "item")?;
        if self.value.is_negative() {
            return Err(ValidationError::NegativeValue { value: self.value });
        }
        Ok(())
    }
}

/// Partial update for one item. `None` fields keep the stored value.
///
/// Nullable columns use a nested option: `Some(None)` clears the column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemUpdate {
    pub id: ItemId,
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub is_fragile: Option<bool>,
    pub value: Option<Money>,
    pub image_ref: Option<Option<String>>,
    pub box_id: Option<Option<BoxId>>,
}

impl ItemUpdate {
    pub fn new(id: ItemId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    pub fn fragile(mut self, is_fragile: bool) -> Self {
        self.is_fragile = Some(is_fragile);
        self
    }

    pub fn value(mut self, value: Money) -> Self {
        self.value = Some(value);
        self
    }

    pub fn image_ref(mut self, image_ref: Option<String>) -> Self {
        self.image_ref = Some(image_ref);
        self
    }

    /// Moves the item into `box_id`, or detaches it with `None`.
    pub fn box_id(mut self, box_id: Option<BoxId>) -> Self {
        self.box_id = Some(box_id);
        self
    }

    /// Merges this patch into `item` and refreshes `last_modified`.
    pub fn apply_to(&self, item: &mut Item) {
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(description) = &self.description {
            item.description = description.clone();
        }
        if let Some(is_fragile) = self.is_fragile {
            item.is_fragile = is_fragile;
        }
        if let Some(value) = self.value {
            item.value = value;
        }
        if let Some(image_ref) = &self.image_ref {
            item.image_ref = image_ref.clone();
        }
        if let Some(box_id) = self.box_id {
            item.box_id = box_id;
        }
        item.last_modified = next_modified(Some(item.last_modified));
    }
}

impl From<&Item> for ItemUpdate {
    /// Full-record update: every field overwrites the stored one.
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            name: Some(item.name.clone()),
            description: Some(item.description.clone()),
            is_fragile: Some(item.is_fragile),
            value: Some(item.value),
            image_ref: Some(item.image_ref.clone()),
            box_id: Some(item.box_id),
        }
    }
}
