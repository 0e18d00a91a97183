use chrono::Duration;

use course_core::model::{Item, ItemIndex, Section, SectionNumber};
use course_core::time::fixed_now;
use storage::repository::{ItemRepository, SectionRepository, StorageError};
use storage::sqlite::SqliteStore;

fn build_section(number: u32, title: &str) -> Section {
    Section::new(SectionNumber::new(number), title).unwrap()
}

fn build_item(index: u32, section: u32, minutes: i64) -> Item {
    Item::new(
        ItemIndex::new(index),
        SectionNumber::new(section),
        format!("Video {index}"),
        Duration::minutes(minutes),
    )
    .unwrap()
}

#[tokio::test]
async fn sqlite_roundtrips_sections_and_items() {
    let store = SqliteStore::connect("sqlite:file:memdb_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    store.migrate().await.expect("migrate");

    store
        .upsert_section(&build_section(1, "Section: Fundamentals"))
        .await
        .unwrap();
    store.upsert_item(&build_item(1, 1, 14)).await.unwrap();
    store.upsert_item(&build_item(2, 1, 31)).await.unwrap();

    let sections = store.list_sections().await.unwrap();
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].display_name(), "Fundamentals");

    let items = store.items_in_section(SectionNumber::new(1)).await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].duration(), Duration::minutes(14));
    assert!(!items[0].is_done());
}

#[tokio::test]
async fn sqlite_set_item_status_persists_and_clears_timestamp() {
    let store = SqliteStore::connect("sqlite:file:memdb_status?mode=memory&cache=shared")
        .await
        .expect("connect");
    store.migrate().await.expect("migrate");

    store
        .upsert_section(&build_section(1, "Section: Workflow"))
        .await
        .unwrap();
    store.upsert_item(&build_item(1, 1, 20)).await.unwrap();

    let at = fixed_now();
    let updated = store
        .set_item_status(ItemIndex::new(1), true, at)
        .await
        .unwrap();
    assert!(updated.is_done());
    assert_eq!(updated.finished_at(), Some(at));

    let fetched = store.get_item(ItemIndex::new(1)).await.unwrap();
    assert_eq!(fetched, updated);

    // Un-marking clears the timestamp again.
    let reverted = store
        .set_item_status(ItemIndex::new(1), false, at)
        .await
        .unwrap();
    assert!(!reverted.is_done());
    assert_eq!(reverted.finished_at(), None);
}

#[tokio::test]
async fn sqlite_set_item_status_is_idempotent() {
    let store = SqliteStore::connect("sqlite:file:memdb_idem?mode=memory&cache=shared")
        .await
        .expect("connect");
    store.migrate().await.expect("migrate");

    store
        .upsert_section(&build_section(1, "Section: Workflow"))
        .await
        .unwrap();
    store.upsert_item(&build_item(1, 1, 20)).await.unwrap();

    let at = fixed_now();
    let once = store
        .set_item_status(ItemIndex::new(1), true, at)
        .await
        .unwrap();
    let twice = store
        .set_item_status(ItemIndex::new(1), true, at)
        .await
        .unwrap();
    assert_eq!(once, twice);
    assert_eq!(store.get_item(ItemIndex::new(1)).await.unwrap(), once);
}

#[tokio::test]
async fn sqlite_reports_missing_item() {
    let store = SqliteStore::connect("sqlite:file:memdb_missing?mode=memory&cache=shared")
        .await
        .expect("connect");
    store.migrate().await.expect("migrate");

    let err = store
        .set_item_status(ItemIndex::new(99), true, fixed_now())
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::ItemNotFound(index) if index == ItemIndex::new(99)));
}

#[tokio::test]
async fn sqlite_reports_schema_mismatch_for_wrong_table_shape() {
    let store = SqliteStore::connect("sqlite:file:memdb_schema?mode=memory&cache=shared")
        .await
        .expect("connect");

    // No migration: stand up an items table missing most columns.
    sqlx::query("CREATE TABLE items (idx INTEGER PRIMARY KEY)")
        .execute(store.pool())
        .await
        .unwrap();
    sqlx::query("INSERT INTO items (idx) VALUES (1)")
        .execute(store.pool())
        .await
        .unwrap();

    let err = store.list_items().await.unwrap_err();
    assert!(matches!(err, StorageError::SchemaMismatch(_)), "got {err:?}");
}

#[tokio::test]
async fn sqlite_rejects_inconsistent_stored_row() {
    let store = SqliteStore::connect("sqlite:file:memdb_inconsistent?mode=memory&cache=shared")
        .await
        .expect("connect");
    store.migrate().await.expect("migrate");

    store
        .upsert_section(&build_section(1, "Section: Workflow"))
        .await
        .unwrap();
    // done without a finished timestamp, written behind the repository's back
    sqlx::query(
        "INSERT INTO items (idx, section_number, title, duration_secs, done, finished_at)
         VALUES (1, 1, 'Video 1', 600, 1, NULL)",
    )
    .execute(store.pool())
    .await
    .unwrap();

    let err = store.get_item(ItemIndex::new(1)).await.unwrap_err();
    assert!(matches!(err, StorageError::SchemaMismatch(_)), "got {err:?}");
}
