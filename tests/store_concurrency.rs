//! Concurrency Tests
//!
//! Many threads sharing one store must never lose an update:
//! - concurrent creates get distinct ids and all survive
//! - readers running alongside writers always see a well-formed document
//! - concurrent signups with one email admit exactly one account

use chirpstore::collections::{ListOptions, PostsManager, UsersManager};
use chirpstore::content::ContentPolicy;
use chirpstore::store::{RecordStore, StoreError, StoreResult};
use chirpstore::auth::CredentialCodec;
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn open_store(dir: &TempDir) -> Arc<RecordStore> {
    Arc::new(RecordStore::open(dir.path().join("database.json")).expect("Failed to open store"))
}

struct PlainCodec;

impl CredentialCodec for PlainCodec {
    fn hash(&self, secret: &str) -> StoreResult<String> {
        Ok(format!("plain:{}", secret))
    }

    fn verify(&self, digest: &str, candidate: &str) -> bool {
        digest == format!("plain:{}", candidate)
    }
}

// =============================================================================
// Lost updates
// =============================================================================

#[test]
fn test_concurrent_post_creates_are_all_persisted() {
    const THREADS: usize = 16;
    const PER_THREAD: usize = 5;

    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let posts = Arc::new(PostsManager::new(store.clone(), ContentPolicy::default()));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let posts = posts.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                (0..PER_THREAD)
                    .map(|i| {
                        posts
                            .create(&format!("thread {} post {}", t, i), t as u64)
                            .expect("create failed")
                            .id
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let ids: Vec<u64> = handles
        .into_iter()
        .flat_map(|h| h.join().expect("thread panicked"))
        .collect();

    let unique: HashSet<u64> = ids.iter().copied().collect();
    assert_eq!(unique.len(), THREADS * PER_THREAD, "duplicate ids handed out");

    let persisted = store.read().unwrap();
    assert_eq!(persisted.posts.len(), THREADS * PER_THREAD, "lost update");
    assert_eq!(
        persisted.posts.keys().copied().collect::<HashSet<_>>(),
        unique
    );
}

#[test]
fn test_readers_see_whole_documents_during_writes() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let posts = Arc::new(PostsManager::new(store.clone(), ContentPolicy::default()));

    let writer = {
        let posts = posts.clone();
        thread::spawn(move || {
            for i in 0..50 {
                posts.create(&format!("post {}", i), 1).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let posts = posts.clone();
            thread::spawn(move || {
                let mut last_seen = 0;
                for _ in 0..50 {
                    let listed = posts
                        .list(ListOptions::default())
                        .expect("reader observed a broken document");
                    assert!(listed.len() >= last_seen, "post count went backwards");
                    last_seen = listed.len();
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for r in readers {
        r.join().unwrap();
    }

    assert_eq!(posts.list(ListOptions::default()).unwrap().len(), 50);
}

#[test]
fn test_two_instances_on_one_path_keep_document_whole() {
    const WRITES: usize = 40;

    let dir = TempDir::new().unwrap();
    let first = open_store(&dir);
    let second = open_store(&dir);
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = [first.clone(), second]
        .into_iter()
        .map(|store| {
            let barrier = barrier.clone();
            thread::spawn(move || {
                let posts = PostsManager::new(store, ContentPolicy::default());
                barrier.wait();
                (0..WRITES)
                    .map(|i| posts.create(&format!("post {}", i), 1).map(|_| ()))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for h in handles {
        for result in h.join().unwrap() {
            assert!(result.is_ok(), "persist failed: {:?}", result);
        }
    }

    assert!(!first.read().unwrap().posts.is_empty());
    let names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(names.len(), 1, "temp files left behind: {:?}", names);
}

#[test]
fn test_concurrent_signups_with_same_email() {
    const THREADS: usize = 8;

    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let users = Arc::new(UsersManager::with_codec(store.clone(), PlainCodec));
    let barrier = Arc::new(Barrier::new(THREADS));

    let results: Vec<_> = (0..THREADS)
        .map(|_| {
            let users = users.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                users.create("same@example.com", "pw")
            })
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect();

    let created = results.iter().filter(|r| r.is_ok()).count();
    let rejected = results
        .iter()
        .filter(|r| matches!(r, Err(StoreError::AlreadyExists(_))))
        .count();

    assert_eq!(created, 1);
    assert_eq!(rejected, THREADS - 1);
    assert_eq!(store.read().unwrap().users.len(), 1);
}
