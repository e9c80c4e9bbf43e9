//! Box domain model: the middle level of the hierarchy.
//!
//! Named `StorageBox` so it never shadows `std::boxed::Box`.

use super::collection::CollectionId;
use super::{next_modified, now_epoch_ms, validate_name, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one box.
pub type BoxId = Uuid;

/// Persisted box record. Value and fragility are derived from its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageBox {
    pub id: BoxId,
    pub name: String,
    pub description: Option<String>,
    pub last_modified: i64,
    /// Owning collection. `None` while unassigned.
    pub collection_id: Option<CollectionId>,
}

impl StorageBox {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    pub fn with_id(id: BoxId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            last_modified: now_epoch_ms(),
            collection_id: None,
        }
    }

    pub fn in_collection(mut self, collection_id: CollectionId) -> Self {
        self.collection_id = Some(collection_id);
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_orphan(&self) -> bool {
        self.collection_id.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name, "box")
    }
}

/// Partial update for one box.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoxUpdate {
    pub id: BoxId,
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub collection_id: Option<Option<CollectionId>>,
}

impl BoxUpdate {
    pub fn new(id: BoxId) -> Self {
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

    pub fn collection_id(mut self, collection_id: Option<CollectionId>) -> Self {
        self.collection_id = Some(collection_id);
        self
    }

    pub fn apply_to(&self, storage_box: &mut StorageBox) {
        if let Some(name) = &self.name {
            storage_box.name = name.clone();
        }
        if let Some(description) = &self.description {
            storage_box.description = description.clone();
        }
        if let Some(collection_id) = self.collection_id {
            storage_box.collection_id = collection_id;
        }
        storage_box.last_modified = next_modified(Some(storage_box.last_modified));
    }
}

impl From<&StorageBox> for BoxUpdate {
    fn from(storage_box: &StorageBox) -> Self {
        Self {
            id: storage_box.id,
            name: Some(storage_box.name.clone()),
            description: Some(storage_box.description.clone()),
            collection_id: Some(storage_box.collection_id),
        }
    }
}
