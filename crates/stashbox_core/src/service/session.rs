//! Session bootstrap: optional demo reset, then live view synchronizers.

use super::demo;
use crate::aggregate::{BoxSummary, CollectionSummary};
use crate::config::StashboxConfig;
use crate::model::item::Item;
use crate::repo::{run_blocking, RepoResult};
use crate::store::Store;
use crate::view::{
    boxes_view, cards_view, collections_view, items_view, CardData, ViewStateSync,
};
use log::info;

/// Live view states for one application session.
pub struct InventorySession {
    store: Store,
    items: ViewStateSync<Vec<Item>>,
    boxes: ViewStateSync<Vec<BoxSummary>>,
    collections: ViewStateSync<Vec<CollectionSummary>>,
    cards: ViewStateSync<Vec<CardData>>,
}

impl InventorySession {
    /// Starts every synchronizer against `store`.
    ///
    /// With `demo_mode`, the store is cleared and re-seeded on the blocking
    /// pool before any observation begins, so the first published state is
    /// the demo dataset. Fails with `RepoError::Runtime` outside Tokio.
    pub async fn start(store: Store, config: &StashboxConfig) -> RepoResult<Self> {
        if config.demo_mode {
            let seeded = store.clone();
            run_blocking("demo_seed", move || {
                demo::reset(&seeded)?;
                demo::seed_demo_data(&seeded)
            })
            .await?;
        }

        let mut session = Self {
            items: ViewStateSync::new(store.clone(), items_view()),
            boxes: ViewStateSync::new(store.clone(), boxes_view()),
            collections: ViewStateSync::new(store.clone(), collections_view()),
            cards: ViewStateSync::new(store.clone(), cards_view()),
            store,
        };
        session.restart()?;
        info!(
            "event=session_start module=service status=ok demo_mode={}",
            config.demo_mode
        );
        Ok(session)
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn items(&self) -> &ViewStateSync<Vec<Item>> {
        &self.items
    }

    pub fn boxes(&self) -> &ViewStateSync<Vec<BoxSummary>> {
        &self.boxes
    }

    pub fn collections(&self) -> &ViewStateSync<Vec<CollectionSummary>> {
        &self.collections
    }

    pub fn cards(&self) -> &ViewStateSync<Vec<CardData>> {
        &self.cards
    }

    /// Re-initializes every synchronizer, clearing any `Error` state.
    pub fn restart(&mut self) -> RepoResult<()> {
        self.items.restart()?;
        self.boxes.restart()?;
        self.collections.restart()?;
        self.cards.restart()
    }

    pub fn stop(&mut self) {
        self.items.stop();
        self.boxes.stop();
        self.collections.stop();
        self.cards.stop();
    }
}
