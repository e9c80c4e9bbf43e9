//! Core of the stashbox personal inventory tracker.
//!
//! Belongings are organized as collections -> boxes -> items. Items carry the
//! raw value and fragility; boxes and collections derive theirs on read.
//! This crate is the single source of truth for those roll-up invariants.

pub mod aggregate;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;
pub mod view;

pub use aggregate::{BoxSummary, CollectionSummary, InventorySummary, Rollup};
pub use config::{ConfigError, StashboxConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::collection::{Collection, CollectionId, CollectionUpdate};
pub use model::item::{Item, ItemId, ItemUpdate};
pub use model::storage_box::{BoxId, BoxUpdate, StorageBox};
pub use model::{Money, ValidationError};
pub use repo::{
    AsyncRepository, RepoError, RepoResult, Repository, SqliteBoxRepository,
    SqliteCollectionRepository, SqliteItemRepository,
};
pub use service::inventory_service::{InventoryOverview, InventoryService};
pub use service::session::InventorySession;
pub use store::{Store, StreamError, Table, TableSnapshot, TableStream};
pub use view::{CardData, CardKind, ViewState, ViewStateSync};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
