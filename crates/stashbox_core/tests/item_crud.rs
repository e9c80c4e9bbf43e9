use stashbox_core::{
    Item, ItemUpdate, Money, RepoError, Repository, StorageBox, Store, Table, ValidationError,
};
use uuid::Uuid;

fn setup() -> Store {
    Store::open_in_memory().unwrap()
}

#[test]
fn insert_then_get_roundtrips_modulo_id_and_timestamp() {
    let store = setup();
    let repo = store.items();

    let mut draft = Item::with_id(Uuid::nil(), "Camera", Money::from_units(250, 0))
        .fragile(true)
        .described("35mm film");
    draft.image_ref = Some("img/camera.jpg".to_string());

    let stored = repo.insert(&draft).unwrap();
    assert!(!stored.id.is_nil());

    let loaded = repo.get(stored.id).unwrap().unwrap();
    assert_eq!(loaded, stored);
    assert_eq!(
        Item {
            id: draft.id,
            last_modified: draft.last_modified,
            ..loaded
        },
        draft
    );
}

#[test]
fn get_missing_returns_none() {
    let store = setup();
    assert_eq!(store.items().get(Uuid::new_v4()).unwrap(), None);
}

#[test]
fn insert_with_existing_id_overwrites() {
    let store = setup();
    let repo = store.items();

    let first = repo
        .insert(&Item::new("Chair", Money::from_units(20, 0)))
        .unwrap();
    let replacement = Item::with_id(first.id, "Armchair", Money::from_units(90, 0));
    let second = repo.insert(&replacement).unwrap();

    let all = repo.list_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "Armchair");
    assert_eq!(all[0].value, Money::from_units(90, 0));
    assert!(second.last_modified > first.last_modified);
}

#[test]
fn updating_name_only_preserves_other_fields_and_advances_timestamp() {
    let store = setup();
    let repo = store.items();
    let storage_box = store.boxes().insert(&StorageBox::new("Shelf")).unwrap();

    let original = repo
        .insert(
            &Item::new("Vase", Money::from_units(12, 0))
                .fragile(true)
                .in_box(storage_box.id),
        )
        .unwrap();

    let updated = repo
        .update(&ItemUpdate::new(original.id).name("Tall vase"))
        .unwrap();

    assert_eq!(updated.name, "Tall vase");
    assert_eq!(updated.value, original.value);
    assert_eq!(updated.is_fragile, original.is_fragile);
    assert_eq!(updated.box_id, original.box_id);
    assert!(updated.last_modified > original.last_modified);
    assert_eq!(repo.get(original.id).unwrap(), Some(updated));
}

#[test]
fn full_record_update_overwrites_every_field() {
    let store = setup();
    let repo = store.items();
    let original = repo
        .insert(&Item::new("Radio", Money::from_units(15, 0)).described("old"))
        .unwrap();

    let mut edited = original.clone();
    edited.name = "Transistor radio".to_string();
    edited.description = None;
    edited.value = Money::from_units(40, 0);
    let updated = repo.update(&ItemUpdate::from(&edited)).unwrap();

    assert_eq!(updated.name, "Transistor radio");
    assert_eq!(updated.description, None);
    assert_eq!(updated.value, Money::from_units(40, 0));
}

#[test]
fn update_missing_id_fails_and_leaves_store_unchanged() {
    let store = setup();
    let repo = store.items();
    let kept = repo
        .insert(&Item::new("Kept", Money::from_units(1, 0)))
        .unwrap();

    let missing = Uuid::new_v4();
    let err = repo.update(&ItemUpdate::new(missing).name("new")).unwrap_err();

    assert!(
        matches!(err, RepoError::NotFound { table: Table::Items, id } if id == missing)
    );
    assert_eq!(repo.list_all().unwrap(), vec![kept]);
}

#[test]
fn update_rejects_negative_value() {
    let store = setup();
    let repo = store.items();
    let item = repo
        .insert(&Item::new("Book", Money::from_units(5, 0)))
        .unwrap();

    let err = repo
        .update(&ItemUpdate::new(item.id).value(Money::from_cents(-1)))
        .unwrap_err();

    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::NegativeValue { .. })
    ));
    assert_eq!(repo.get(item.id).unwrap(), Some(item));
}

#[test]
fn delete_missing_id_is_a_noop() {
    let store = setup();
    let repo = store.items();
    let kept = repo
        .insert(&Item::new("Kept", Money::from_units(3, 0)))
        .unwrap();

    repo.delete(Uuid::new_v4()).unwrap();

    assert_eq!(repo.list_all().unwrap(), vec![kept]);
}

#[test]
fn delete_removes_record() {
    let store = setup();
    let repo = store.items();
    let item = repo
        .insert(&Item::new("Gone", Money::from_units(3, 0)))
        .unwrap();

    repo.delete(item.id).unwrap();

    assert_eq!(repo.get(item.id).unwrap(), None);
}

#[test]
fn batch_insert_is_all_or_nothing_on_validation_failure() {
    let store = setup();
    let repo = store.items();

    let err = repo
        .insert_all(&[
            Item::new("Fine", Money::from_units(1, 0)),
            Item::new("   ", Money::from_units(1, 0)),
        ])
        .unwrap_err();

    assert!(matches!(err, RepoError::Validation(_)));
    assert!(repo.list_all().unwrap().is_empty());
}

#[test]
fn batch_insert_is_all_or_nothing_on_store_failure() {
    let store = setup();
    let repo = store.items();

    let err = repo
        .insert_all(&[
            Item::new("Fine", Money::from_units(1, 0)),
            Item::new("Dangling", Money::from_units(1, 0)).in_box(Uuid::new_v4()),
        ])
        .unwrap_err();

    assert!(matches!(err, RepoError::Db(_)));
    assert!(repo.list_all().unwrap().is_empty());
}

#[test]
fn batch_insert_returns_records_in_input_order() {
    let store = setup();
    let names = ["one", "two", "three"];
    let items: Vec<Item> = names
        .iter()
        .map(|name| Item::new(*name, Money::ZERO))
        .collect();

    let stored = store.items().insert_all(&items).unwrap();

    let stored_names: Vec<&str> = stored.iter().map(|item| item.name.as_str()).collect();
    assert_eq!(stored_names, names);
}

#[test]
fn clear_removes_every_item() {
    let store = setup();
    let repo = store.items();
    repo.insert_all(&[
        Item::new("a", Money::ZERO),
        Item::new("b", Money::ZERO),
    ])
    .unwrap();

    repo.clear().unwrap();

    assert!(repo.list_all().unwrap().is_empty());
}

#[test]
fn list_by_box_separates_boxed_and_orphan_items() {
    let store = setup();
    let storage_box = store.boxes().insert(&StorageBox::new("Crate")).unwrap();
    let boxed = store
        .items()
        .insert(&Item::new("Boxed", Money::ZERO).in_box(storage_box.id))
        .unwrap();
    let orphan = store.items().insert(&Item::new("Loose", Money::ZERO)).unwrap();

    assert_eq!(
        store.items().list_by_box(Some(storage_box.id)).unwrap(),
        vec![boxed]
    );
    assert_eq!(store.items().list_by_box(None).unwrap(), vec![orphan]);
}

#[test]
fn item_serializes_with_snake_case_fields() {
    let item = Item::new("Lamp", Money::from_cents(2500)).fragile(true);
    let json = serde_json::to_value(&item).unwrap();

    assert_eq!(json["name"], "Lamp");
    assert_eq!(json["value"], 2500);
    assert_eq!(json["is_fragile"], true);
    assert!(json["box_id"].is_null());
}
