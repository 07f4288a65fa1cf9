//! Favorites persistence, restart and legacy migration through real storage
//! backends.

mod common;

use commitmark::favorites::{FavoritesStore, FormatVersion};
use commitmark::models::FavoriteRecord;
use commitmark::storage::{FileStore, KeyValueStore, MemoryStore};
use common::record;
use tempfile::TempDir;

fn file_store(dir: &TempDir) -> Option<Box<dyn KeyValueStore>> {
    Some(Box::new(FileStore::new(dir.path().join("favorites"))))
}

fn restart(dir: &TempDir) -> FavoritesStore {
    let mut store = FavoritesStore::new(file_store(dir));
    store.init();
    store
}

#[test]
fn test_sequence_net_effect() {
    let mut store = FavoritesStore::in_memory();
    store.init();
    store.add_favorite("a", None);
    store.add_favorite("b", Some(record("b", "2024-01-01T00:00:00Z")));
    store.toggle_favorite("c", None);
    store.remove_favorite("a");
    store.toggle_favorite("b", None);
    store.add_favorite("a", None);

    assert!(store.is_favorite("a"));
    assert!(!store.is_favorite("b"));
    assert!(store.is_favorite("c"));
    assert_eq!(store.list_favorite_ids(), vec!["c".to_string(), "a".to_string()]);
    assert!(store.get_favorite_record("b").is_none());
}

#[test]
fn test_restart_reproduces_ids_and_records() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = restart(&dir);
        store.add_favorite("old", Some(record("old", "2022-05-01T10:00:00Z")));
        store.add_favorite("bare", None);
        store.add_favorite("new", Some(record("new", "2024-05-01T10:00:00Z")));
        store.toggle_favorite("gone", None);
        store.toggle_favorite("gone", None);
    }

    let store = restart(&dir);
    assert_eq!(store.list_favorite_ids(), vec!["old".to_string(), "bare".to_string(), "new".to_string()]);
    assert_eq!(store.get_favorite_record("old"), Some(&record("old", "2022-05-01T10:00:00Z")));
    assert_eq!(store.get_favorite_record("new"), Some(&record("new", "2024-05-01T10:00:00Z")));
    assert!(store.get_favorite_record("bare").is_none());
    assert!(!store.is_favorite("gone"));
}

#[test]
fn test_persisted_slots_hold_both_formats() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = restart(&dir);
        store.add_favorite("a", Some(record("a", "2024-01-01T00:00:00Z")));
        store.add_favorite("b", None);
    }

    let raw = FileStore::new(dir.path().join("favorites"));
    let legacy: Vec<String> = serde_json::from_str(&raw.get(FormatVersion::Legacy.slot()).unwrap().unwrap()).unwrap();
    let rich: Vec<FavoriteRecord> = serde_json::from_str(&raw.get(FormatVersion::Rich.slot()).unwrap().unwrap()).unwrap();
    assert_eq!(legacy, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(rich, vec![record("a", "2024-01-01T00:00:00Z")]);
}

#[test]
fn test_legacy_migration_then_backfill() {
    let dir = TempDir::new().unwrap();
    let mut raw = FileStore::new(dir.path().join("favorites"));
    raw.set(FormatVersion::Legacy.slot(), r#"["111aaa","222bbb","333ccc"]"#).unwrap();

    let mut store = restart(&dir);
    assert_eq!(store.list_favorite_ids(), vec!["111aaa".to_string(), "222bbb".to_string(), "333ccc".to_string()]);
    assert!(store.list_favorite_records().is_empty());

    store.add_favorite("222bbb", Some(record("222bbb", "2024-02-02T00:00:00Z")));
    assert_eq!(store.list_favorite_records(), vec![record("222bbb", "2024-02-02T00:00:00Z")]);
    assert_eq!(store.len(), 3);

    let store = restart(&dir);
    assert_eq!(store.list_favorite_ids().len(), 3);
    assert!(store.is_favorite("111aaa"));
    assert_eq!(store.list_favorite_records().len(), 1);
}

#[test]
fn test_rich_format_scenario() {
    let rich = r#"[{"id":"abc123","ownerName":"octo","containerName":"Hello-World","summary":"Fix bug","timestamp":"2024-01-01T00:00:00Z","authorDisplayName":"Octo Cat","externalUrl":"https://example/commit/abc123"}]"#;
    let storage = MemoryStore::new().with_slot(FormatVersion::Rich.slot(), rich);
    let mut store = FavoritesStore::new(Some(Box::new(storage)));
    store.init();

    assert!(store.is_favorite("abc123"));
    let expected = FavoriteRecord {
        id: "abc123".to_string(),
        owner_name: "octo".to_string(),
        container_name: "Hello-World".to_string(),
        summary: "Fix bug".to_string(),
        timestamp: "2024-01-01T00:00:00Z".to_string(),
        author_display_name: "Octo Cat".to_string(),
        author_avatar_url: None,
        external_url: "https://example/commit/abc123".to_string(),
    };
    assert_eq!(store.get_favorite_record("abc123"), Some(&expected));
}

#[test]
fn test_records_listed_newest_first() {
    let mut store = FavoritesStore::in_memory();
    store.add_favorite("t2", Some(record("t2", "2024-06-01T00:00:00Z")));
    store.add_favorite("t1", Some(record("t1", "2024-01-01T00:00:00Z")));
    store.add_favorite("t3", Some(record("t3", "2024-12-01T00:00:00Z")));
    let ids: Vec<String> = store.list_favorite_records().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec!["t3", "t2", "t1"]);
}

#[test]
fn test_no_storage_works_in_memory() {
    let mut store = FavoritesStore::new(None);
    store.init();
    store.init();
    assert!(store.toggle_favorite("x", Some(record("x", "2024-01-01T00:00:00Z"))));
    store.add_favorite("y", None);
    store.remove_favorite("nope");
    assert_eq!(store.list_favorite_ids(), vec!["x".to_string(), "y".to_string()]);
    assert!(!store.is_persistent());
    assert!(store.last_warning().is_none());
}
