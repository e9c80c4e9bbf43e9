//! Collection domain model: the root level of the hierarchy.

use super::{next_modified, now_epoch_ms, validate_name, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one collection.
pub type CollectionId = Uuid;

/// Persisted collection record. Value and fragility are derived from its boxes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub name: String,
    pub description: Option<String>,
    pub last_modified: i64,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    pub fn with_id(id: CollectionId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            last_modified: now_epoch_ms(),
        }
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name, "collection")
    }
}

/// Partial update for one collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionUpdate {
    pub id: CollectionId,
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

impl CollectionUpdate {
    pub fn new(id: CollectionId) -> Self {
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

    pub fn apply_to(&self, collection: &mut Collection) {
        if let Some(name) = &self.name {
            collection.name = name.clone();
        }
        if let Some(description) = &self.description {
            collection.description = description.clone();
        }
        collection.last_modified = next_modified(Some(collection.last_modified));
    }
}

impl From<&Collection> for CollectionUpdate {
    fn from(collection: &Collection) -> Self {
        Self {
            id: collection.id,
            name: Some(collection.name.clone()),
            description: Some(collection.description.clone()),
        }
    }
}
