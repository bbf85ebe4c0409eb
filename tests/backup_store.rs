//! BackupStore: save/load, idempotence, prefix lookup, listing.

mod common;

use focus::backup::{content_hash, BackupStore};
use focus::error::FocusError;

#[test]
fn save_then_load_returns_exact_content() {
    let dir = common::temp_focus_home();
    let store = BackupStore::new(dir.path().join("backups"));

    for content in [common::HOSTS, "", "no trailing newline", "crlf\r\nlines\r\n"] {
        let hash = store.save(content).unwrap();
        assert_eq!(hash, content_hash(content));
        assert_eq!(store.load(&hash).unwrap(), content);
    }
}

#[test]
fn save_twice_same_hash_one_file() {
    let dir = common::temp_focus_home();
    let store = BackupStore::new(dir.path().join("backups"));

    let a = store.save(common::HOSTS).unwrap();
    let b = store.save(common::HOSTS).unwrap();
    assert_eq!(a, b);
    assert_eq!(store.list().unwrap().len(), 1);
    assert!(store.path_for(&a).is_file());
}

#[test]
fn load_unknown_hash_is_not_found() {
    let dir = common::temp_focus_home();
    let store = BackupStore::new(dir.path().join("backups"));
    let missing = content_hash("never saved");
    assert!(matches!(store.load(&missing), Err(FocusError::NotFound(_))));
}

#[test]
fn resolve_prefix() {
    let dir = common::temp_focus_home();
    let store = BackupStore::new(dir.path());
    let hash = store.save("one").unwrap();

    assert_eq!(store.resolve(&hash).unwrap(), hash);
    assert_eq!(store.resolve(&hash[..8]).unwrap(), hash);
    assert_eq!(store.resolve(&hash[..8].to_uppercase()).unwrap(), hash);
    assert!(matches!(store.resolve(&hash[..3]), Err(FocusError::NotFound(_))));
    assert!(matches!(store.resolve("zzzzzzzz"), Err(FocusError::NotFound(_))));
}

#[test]
fn resolve_ambiguous_prefix() {
    let dir = common::temp_focus_home();
    let store = BackupStore::new(dir.path());
    // Two stored names sharing a prefix.
    let a = format!("abcd{}", "0".repeat(60));
    let b = format!("abcd{}", "1".repeat(60));
    std::fs::write(dir.path().join(&a), "a").unwrap();
    std::fs::write(dir.path().join(&b), "b").unwrap();

    assert!(matches!(
        store.resolve("abcd"),
        Err(FocusError::Ambiguous { matches: 2, .. })
    ));
    assert_eq!(store.resolve("abcd1").unwrap(), b);
}

#[test]
fn list_ignores_foreign_files() {
    let dir = common::temp_focus_home();
    let store = BackupStore::new(dir.path());
    store.save("x").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "hi").unwrap();

    let list = store.list().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].hash, content_hash("x"));
    assert_eq!(list[0].size, 1);
}
