use braindump_core::repo::item_store::ITEMS_KEY;
use braindump_core::repo::kv_store::StoreResult;
use braindump_core::{
    open_db, open_db_in_memory, Item, ItemStore, ItemType, KeyValueStore, MemoryKvStore,
    SqliteKvStore, StoreError, Tag,
};
use chrono::{Duration, TimeZone, Utc};

struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn get(&self, _key: &str) -> StoreResult<Option<String>> {
        Err(StoreError::InvalidData("storage unavailable".to_string()))
    }

    fn set(&self, _key: &str, _value: &str) -> StoreResult<()> {
        Err(StoreError::InvalidData("storage unavailable".to_string()))
    }
}

fn sample_items() -> Vec<Item> {
    let created = Utc.with_ymd_and_hms(2025, 1, 24, 9, 0, 0).unwrap();
    let mut event = Item::new(
        ItemType::Event,
        "Meeting with Jane",
        "Meeting with Jane",
        "meeting with Jane tomorrow at 3pm",
        created,
    );
    event.set_due_date(
        Some(Utc.with_ymd_and_hms(2025, 1, 25, 15, 0, 0).unwrap()),
        true,
        created + Duration::minutes(1),
    );
    event.set_tags(
        vec![Tag::from_palette("meeting").unwrap()],
        created + Duration::minutes(2),
    );

    let mut task = Item::new(ItemType::Task, "Buy milk", "buy milk", "buy milk", created);
    task.toggle_completed(created + Duration::minutes(3));

    vec![event, task]
}

#[test]
fn sqlite_store_round_trips_items_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("braindump.db");
    let items = sample_items();

    {
        let conn = open_db(&path).unwrap();
        ItemStore::new(SqliteKvStore::new(&conn)).try_save(&items).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let loaded = ItemStore::new(SqliteKvStore::new(&conn)).load();
    assert_eq!(loaded, items);
}

#[test]
fn persisted_shape_uses_camel_case_keys() {
    let kv = MemoryKvStore::new();
    ItemStore::new(&kv).save(&sample_items());

    let raw = kv.get(ITEMS_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let first = &value[0];
    assert_eq!(first["type"], "event");
    assert_eq!(first["originalInput"], "meeting with Jane tomorrow at 3pm");
    assert_eq!(first["hasTime"], true);
    assert_eq!(first["dueDate"], "2025-01-25T15:00:00Z");
    assert_eq!(first["tags"][0]["color"], "#10b981");
}

#[test]
fn empty_store_loads_nothing() {
    let conn = open_db_in_memory().unwrap();
    assert!(ItemStore::new(SqliteKvStore::new(&conn)).load().is_empty());
}

#[test]
fn malformed_records_are_dropped_individually() {
    let kv = MemoryKvStore::new();
    let raw = r##"[
        {"id":"keep-1","type":"task","content":"valid","created":"2025-01-01T00:00:00Z","updated":"2025-01-02T00:00:00Z"},
        {"id":"bad-type","type":"reminder","content":"x"},
        {"type":"note","content":"no id"},
        "not an object",
        {"id":"keep-2","type":"note","content":"partial","tags":[{"label":"idea","color":"#6366f1"},{"label":7}],"hasTime":true},
        {"id":"keep-1","type":"note","content":"duplicate id"}
    ]"##;
    kv.set(ITEMS_KEY, raw).unwrap();
    let now = Utc.with_ymd_and_hms(2025, 2, 1, 8, 0, 0).unwrap();

    let decoded = ItemStore::new(&kv).try_load_at(now).unwrap();

    assert_eq!(decoded.rejected, 4);
    assert_eq!(decoded.items.len(), 2);
    assert_eq!(decoded.items[0].content, "valid");

    let partial = &decoded.items[1];
    assert_eq!(partial.title, "partial");
    assert_eq!(partial.original_input, "partial");
    assert_eq!(partial.tags, vec![Tag::new("idea", "#6366f1")]);
    assert!(!partial.has_time, "has_time without due date is cleared");
    assert_eq!(partial.created, now);
    assert_eq!(partial.updated, now);
    assert!(decoded.items.iter().all(|entry| entry.validate().is_ok()));
}

#[test]
fn updated_before_created_is_clamped() {
    let kv = MemoryKvStore::new();
    kv.set(
        ITEMS_KEY,
        r#"[{"id":"a","type":"note","content":"x","created":"2025-01-05T00:00:00Z","updated":"2025-01-01T00:00:00Z"}]"#,
    )
    .unwrap();

    let items = ItemStore::new(&kv).load();
    assert_eq!(items[0].updated, items[0].created);
}

#[test]
fn unreadable_payload_loads_as_empty() {
    let kv = MemoryKvStore::new();
    kv.set(ITEMS_KEY, "{not json").unwrap();
    assert!(ItemStore::new(&kv).load().is_empty());

    kv.set(ITEMS_KEY, r#"{"id":"a"}"#).unwrap();
    assert!(ItemStore::new(&kv).load().is_empty());
}

#[test]
fn failing_storage_is_swallowed() {
    let store = ItemStore::new(BrokenStore);

    assert!(store.load().is_empty());
    store.save(&sample_items());
    assert!(store.try_save(&sample_items()).is_err());
}
