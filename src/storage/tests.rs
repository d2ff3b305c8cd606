//! Tests for credential storage

use super::*;
use tempfile::tempdir;

// ============================================================================
// MemoryStore Tests
// ============================================================================

#[tokio::test]
async fn test_memory_store_get_set_remove() {
    let store = MemoryStore::new();
    assert!(store.get("auth_token").await.unwrap().is_none());

    store.set("auth_token", "abc").await.unwrap();
    assert_eq!(
        store.get("auth_token").await.unwrap(),
        Some("abc".to_string())
    );

    store.remove("auth_token").await.unwrap();
    assert!(store.get("auth_token").await.unwrap().is_none());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_memory_store_last_write_wins() {
    let store = MemoryStore::new();
    store.set("k", "first").await.unwrap();
    store.set("k", "second").await.unwrap();
    assert_eq!(store.get("k").await.unwrap(), Some("second".to_string()));
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_memory_store_with_token() {
    let store = MemoryStore::with_token("tok");
    assert_eq!(
        store.get(StorageKey::AuthToken.as_str()).await.unwrap(),
        Some("tok".to_string())
    );
}

#[tokio::test]
async fn test_memory_store_clones_share_entries() {
    let store = MemoryStore::new();
    let other = store.clone();
    other.set("k", "v").await.unwrap();
    assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
}

#[tokio::test]
async fn test_remove_missing_key_is_ok() {
    let store = MemoryStore::new();
    assert!(store.remove("nope").await.is_ok());
}

#[test]
fn test_storage_key_names() {
    assert_eq!(StorageKey::AuthToken.as_str(), "auth_token");
    assert_eq!(StorageKey::UserData.as_str(), "user_data");
}

// ============================================================================
// FileStore Tests
// ============================================================================

#[tokio::test]
async fn test_file_store_persists_across_open() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("credentials.json");

    let store = FileStore::open(&path).unwrap();
    store.set("auth_token", "secret").await.unwrap();
    store.set("user_data", r#"{"id":1}"#).await.unwrap();
    assert!(path.exists());

    let reopened = FileStore::open(&path).unwrap();
    assert_eq!(
        reopened.get("auth_token").await.unwrap(),
        Some("secret".to_string())
    );
    assert_eq!(
        reopened.get("user_data").await.unwrap(),
        Some(r#"{"id":1}"#.to_string())
    );
}

#[tokio::test]
async fn test_file_store_remove_persists() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("credentials.json");

    let store = FileStore::open(&path).unwrap();
    store.set("auth_token", "secret").await.unwrap();
    store.remove("auth_token").await.unwrap();

    let reopened = FileStore::open(&path).unwrap();
    assert!(reopened.get("auth_token").await.unwrap().is_none());
}

#[tokio::test]
async fn test_file_store_creates_parent_dirs() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("store.json");

    let store = FileStore::open(&path).unwrap();
    store.set("k", "v").await.unwrap();
    assert!(path.exists());
    assert_eq!(store.path(), path.as_path());
}

#[test]
fn test_file_store_missing_file_is_empty() {
    let dir = tempdir().unwrap();
    let store = FileStore::open(dir.path().join("absent.json"));
    assert!(store.is_ok());
}

#[test]
fn test_file_store_rejects_corrupt_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "not json").unwrap();

    let err = FileStore::open(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse store file"));
}
