use rusqlite::Connection;
use stashbox_core::service::demo::{GARAGE, LIVING_ROOM};
use stashbox_core::view::{boxes_view, cards_view, collections_view, items_view};
use stashbox_core::{
    CardKind, Collection, InventorySession, Item, Money, RepoError, Repository, StashboxConfig,
    StorageBox, Store, ViewState, ViewStateSync,
};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep, timeout};

const WAIT: Duration = Duration::from_secs(5);

async fn wait_for<T: Clone>(
    receiver: &mut watch::Receiver<ViewState<T>>,
    mut accept: impl FnMut(&ViewState<T>) -> bool,
) -> ViewState<T> {
    timeout(WAIT, async {
        loop {
            {
                let state = receiver.borrow_and_update();
                if accept(&state) {
                    return state.clone();
                }
            }
            receiver.changed().await.unwrap();
        }
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn sync_starts_loading_then_publishes_success() {
    let store = Store::open_in_memory().unwrap();
    let item = store
        .items()
        .insert(&Item::new("Rug", Money::from_units(70, 0)))
        .unwrap();

    let mut sync = ViewStateSync::new(store.clone(), items_view());
    assert!(sync.state().is_loading());
    assert_eq!(sync.name(), "items");

    sync.start().unwrap();
    let mut states = sync.subscribe();
    let state = wait_for(&mut states, |state| !state.is_loading()).await;

    assert_eq!(state, ViewState::Success(vec![item]));
    assert!(sync.is_running());
}

#[tokio::test]
async fn sync_follows_later_mutations() {
    let store = Store::open_in_memory().unwrap();
    let storage_box = store.boxes().insert(&StorageBox::new("Trunk")).unwrap();
    let mut sync = ViewStateSync::new(store.clone(), boxes_view());
    sync.start().unwrap();
    let mut states = sync.subscribe();
    wait_for(&mut states, |state| state.data().is_some()).await;

    store
        .items()
        .into_async()
        .insert(
            &Item::new("Quilt", Money::from_units(40, 0))
                .fragile(true)
                .in_box(storage_box.id),
        )
        .await
        .unwrap();

    let state = wait_for(&mut states, |state| {
        state
            .data()
            .is_some_and(|boxes| boxes.first().is_some_and(|summary| summary.item_count == 1))
    })
    .await;
    let summary = &state.data().unwrap()[0];
    assert_eq!(summary.value, Money::from_units(40, 0));
    assert!(summary.is_fragile);
}

#[tokio::test]
async fn stopped_sync_keeps_last_state() {
    let store = Store::open_in_memory().unwrap();
    let mut sync = ViewStateSync::new(store.clone(), items_view());
    sync.start().unwrap();
    let mut states = sync.subscribe();
    wait_for(&mut states, |state| state.data().is_some()).await;

    sync.stop();
    store.items().insert(&Item::new("Late", Money::ZERO)).unwrap();
    sleep(Duration::from_millis(20)).await;

    assert!(!sync.is_running());
    assert_eq!(sync.state(), ViewState::Success(Vec::new()));
}

#[tokio::test]
async fn error_is_terminal_until_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inventory.sqlite3");
    let store = Store::open(&path).unwrap();

    let mut sync = ViewStateSync::new(store.clone(), collections_view());
    sync.start().unwrap();
    let mut states = sync.subscribe();
    wait_for(&mut states, |state| state.data().is_some()).await;

    let raw = Connection::open(&path).unwrap();
    raw.execute(
        "INSERT INTO collections (id, name, description, last_modified)
         VALUES ('not-a-uuid', 'Corrupt', NULL, 0);",
        [],
    )
    .unwrap();
    store
        .collections()
        .insert(&Collection::new("Trigger"))
        .unwrap();

    let failed = wait_for(&mut states, ViewState::is_error).await;
    assert!(failed.error().unwrap().contains("not-a-uuid"));

    raw.execute("DELETE FROM collections WHERE id = 'not-a-uuid';", [])
        .unwrap();
    store
        .collections()
        .insert(&Collection::new("Healthy"))
        .unwrap();
    sleep(Duration::from_millis(20)).await;
    assert!(sync.state().is_error());

    sync.restart().unwrap();
    let recovered = wait_for(&mut states, |state| state.data().is_some()).await;
    assert_eq!(recovered.data().unwrap().len(), 2);
}

#[tokio::test]
async fn cards_view_puts_summary_first() {
    let store = Store::open_in_memory().unwrap();
    let collection = store.collections().insert(&Collection::new("Hall")).unwrap();
    let storage_box = store
        .boxes()
        .insert(&StorageBox::new("Shoes").in_collection(collection.id))
        .unwrap();
    store
        .items()
        .insert(&Item::new("Boots", Money::from_units(60, 0)).in_box(storage_box.id))
        .unwrap();

    let mut sync = ViewStateSync::new(store, cards_view());
    sync.start().unwrap();
    let mut states = sync.subscribe();
    let state = wait_for(&mut states, |state| state.data().is_some()).await;

    let kinds: Vec<CardKind> = state.data().unwrap().iter().map(|card| card.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            CardKind::Summary,
            CardKind::Collection,
            CardKind::Box,
            CardKind::Item
        ]
    );
    assert_eq!(state.data().unwrap()[0].value(), Money::from_units(60, 0));
}

#[tokio::test]
async fn demo_session_publishes_seeded_rollups() {
    let store = Store::open_in_memory().unwrap();
    store
        .items()
        .insert(&Item::new("Stale", Money::from_units(1, 0)))
        .unwrap();
    let config = StashboxConfig {
        demo_mode: true,
        ..StashboxConfig::default()
    };

    let session = InventorySession::start(store, &config).await.unwrap();

    let mut items = session.items().subscribe();
    let items = wait_for(&mut items, |state| state.data().is_some()).await;
    assert_eq!(items.data().unwrap().len(), 7);
    assert!(items.data().unwrap().iter().all(|item| item.name != "Stale"));

    let mut collections = session.collections().subscribe();
    let collections = wait_for(&mut collections, |state| state.data().is_some()).await;
    let collections = collections.data().unwrap();
    let living_room = collections
        .iter()
        .find(|summary| summary.collection.id == LIVING_ROOM)
        .unwrap();
    let garage = collections
        .iter()
        .find(|summary| summary.collection.id == GARAGE)
        .unwrap();
    assert_eq!(living_room.value, Money::from_units(175, 0));
    assert!(living_room.is_fragile);
    assert_eq!(garage.value, Money::from_units(195, 50));
    assert!(!garage.is_fragile);

    let mut cards = session.cards().subscribe();
    let cards = wait_for(&mut cards, |state| state.data().is_some()).await;
    assert_eq!(cards.data().unwrap()[0].value(), Money::from_units(395, 50));
}

#[test]
fn starting_outside_a_runtime_fails_without_panicking() {
    let store = Store::open_in_memory().unwrap();
    let mut sync = ViewStateSync::new(store, items_view());

    let err = sync.start().unwrap_err();

    assert!(matches!(err, RepoError::Runtime(_)));
    assert!(!sync.is_running());
    assert!(sync.state().is_loading());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn collections_view_never_loses_items_during_box_delete() {
    let store = Store::open_in_memory().unwrap();
    let collection = store.collections().insert(&Collection::new("Loft")).unwrap();
    let storage_box = store
        .boxes()
        .insert(&StorageBox::new("Crate").in_collection(collection.id))
        .unwrap();
    store
        .items()
        .insert(&Item::new("Lamp", Money::from_units(12, 0)).in_box(storage_box.id))
        .unwrap();

    let mut sync = ViewStateSync::new(store.clone(), collections_view());
    sync.start().unwrap();
    let mut states = sync.subscribe();
    wait_for(&mut states, |state| state.data().is_some()).await;

    store
        .boxes()
        .into_async()
        .delete(storage_box.id)
        .await
        .unwrap();

    let settled = wait_for(&mut states, |state| {
        state
            .data()
            .is_some_and(|collections| collections[0].box_count == 0)
    })
    .await;
    let loft = &settled.data().unwrap()[0];
    assert_eq!(loft.item_count, 0);
    assert_eq!(loft.value, Money::ZERO);
}
