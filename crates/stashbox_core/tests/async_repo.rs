use stashbox_core::{
    BoxUpdate, Collection, Item, ItemUpdate, Money, RepoError, Repository, StorageBox, Store,
};
use std::time::Duration;
use tokio::time::timeout;
use uuid::Uuid;

const WAIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn async_crud_matches_blocking_semantics() {
    let store = Store::open_in_memory().unwrap();
    let items = store.items().into_async();

    let stored = items
        .insert(&Item::new("Kite", Money::from_units(14, 0)))
        .await
        .unwrap();
    assert_eq!(items.get(stored.id).await.unwrap(), Some(stored.clone()));

    let renamed = items
        .update(&ItemUpdate::new(stored.id).name("Box kite"))
        .await
        .unwrap();
    assert_eq!(renamed.value, stored.value);
    assert!(renamed.last_modified > stored.last_modified);

    items.delete(stored.id).await.unwrap();
    assert!(items.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn async_update_of_missing_box_is_not_found() {
    let store = Store::open_in_memory().unwrap();
    let boxes = store.boxes().into_async();

    let err = boxes
        .update(&BoxUpdate::new(Uuid::new_v4()).name("ghost"))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(boxes.blocking().list_all().unwrap().is_empty());
}

#[tokio::test]
async fn async_batch_insert_stays_atomic() {
    let store = Store::open_in_memory().unwrap();
    let items = store.items().into_async();

    let err = items
        .insert_all(&[
            Item::new("ok", Money::ZERO),
            Item::new("bad", Money::from_cents(-1)),
        ])
        .await
        .unwrap_err();

    assert!(matches!(err, RepoError::Validation(_)));
    assert!(items.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn async_writes_reach_subscribers() {
    let store = Store::open_in_memory().unwrap();
    let collections = store.collections().into_async();
    let mut stream = collections.observe_all();
    timeout(WAIT, stream.next()).await.unwrap().unwrap().unwrap();

    let stored = collections
        .insert(&Collection::new("Pantry"))
        .await
        .unwrap();

    let listing = timeout(WAIT, stream.next()).await.unwrap().unwrap().unwrap();
    assert_eq!(listing.as_slice(), &[stored]);

    collections.clear().await.unwrap();
    let cleared = timeout(WAIT, stream.next()).await.unwrap().unwrap().unwrap();
    assert!(cleared.is_empty());
}

#[tokio::test]
async fn async_box_delete_orphans_items() {
    let store = Store::open_in_memory().unwrap();
    let storage_box = store
        .boxes()
        .into_async()
        .insert(&StorageBox::new("Bag"))
        .await
        .unwrap();
    let item = store
        .items()
        .into_async()
        .insert(&Item::new("Keys", Money::ZERO).in_box(storage_box.id))
        .await
        .unwrap();

    store.boxes().into_async().delete(storage_box.id).await.unwrap();

    let orphan = store.items().into_async().get(item.id).await.unwrap().unwrap();
    assert!(orphan.is_orphan());
}
