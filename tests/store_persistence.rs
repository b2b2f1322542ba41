//! Persistence Tests
//!
//! - Everything written survives reopening the document
//! - Identifiers are never reused, even across reopen
//! - Documents in the legacy chirp layout still load
//! - A corrupt document fails loudly and is not overwritten

use chirpstore::collections::{Collections, ListOptions};
use chirpstore::config::StoreConfig;
use chirpstore::store::{Document, RecordStore, StoreError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn config_for(path: &Path) -> StoreConfig {
    StoreConfig {
        database_path: path.to_path_buf(),
        ..Default::default()
    }
}

#[test]
fn test_round_trip_through_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("database.json");

    let written: Document = {
        let c = Collections::open(&config_for(&path)).unwrap();
        let user = c.users.create("a@b.c", "pw").unwrap();
        c.users.upgrade(user.id).unwrap();
        c.posts.create("first fornax post", user.id).unwrap();
        c.refresh_tokens.issue(user.id).unwrap();
        c.store.read().unwrap()
    };

    let reopened = RecordStore::open(&path).unwrap();
    let loaded = reopened.read().unwrap();

    assert_eq!(loaded, written);
    assert_eq!(loaded.posts[&1].body, "first **** post");
    assert!(loaded.users[&1].is_upgraded);
    assert_eq!(loaded.refresh_tokens[&1].user_id, 1);
}

#[test]
fn test_post_ids_not_reused_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("database.json");

    {
        let c = Collections::open(&config_for(&path)).unwrap();
        c.posts.create("one", 1).unwrap();
        let two = c.posts.create("two", 1).unwrap();
        c.posts.delete_by_id(two.id).unwrap();
    }

    let c = Collections::open(&config_for(&path)).unwrap();
    let three = c.posts.create("three", 1).unwrap();

    assert_eq!(three.id, 3);
    let ids: Vec<u64> = c
        .posts
        .list(ListOptions::default())
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec![1, 3]);
}

#[test]
fn test_loads_legacy_chirp_document() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("database.json");
    fs::write(
        &path,
        r#"{
            "chirps": {
                "1": {"id": 1, "body": "hello", "author_id": 1},
                "2": {"id": 2, "body": "world", "author_id": 1}
            },
            "users": {
                "1": {"id": 1, "email": "old@b.c", "password": "$2a$10$legacy", "is_chirpy_red": false}
            },
            "refresh_tokens": {
                "1": {"user_id": 1, "token": "deadbeef", "expires_at": "2030-01-01T00:00:00Z"}
            }
        }"#,
    )
    .unwrap();

    let c = Collections::open(&config_for(&path)).unwrap();

    assert_eq!(c.posts.get_by_id(2).unwrap().body, "world");
    assert_eq!(c.refresh_tokens.lookup("deadbeef").unwrap().user_id, 1);
    assert_eq!(c.posts.create("next", 1).unwrap().id, 3);

    let raw: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    assert!(raw.get("posts").is_some());
    assert_eq!(raw["sequences"]["posts"], 3);
}

#[test]
fn test_corrupt_document_is_not_overwritten() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("database.json");
    let c = Collections::open(&config_for(&path)).unwrap();
    fs::write(&path, b"not json").unwrap();

    let result = c.posts.create("hello", 1);

    assert!(matches!(result, Err(StoreError::Decode { .. })));
    assert_eq!(fs::read(&path).unwrap(), b"not json");
}

#[test]
fn test_unwritable_path_fails_with_io_error() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("file");
    fs::write(&blocker, b"").unwrap();

    // A regular file where a directory is expected
    let result = RecordStore::open(blocker.join("database.json"));

    assert!(matches!(result, Err(StoreError::StorageIo { .. })));
}
