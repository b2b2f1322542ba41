//! # Document Model
//!
//! The single persisted aggregate and the three entity types it holds.
//! Map keys are serialized as decimal strings, which is how JSON objects
//! carry integer keys.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier type shared by every collection
pub type RecordId = u64;

/// A short text post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: RecordId,

    /// Validated, redacted body
    pub body: String,

    pub author_id: RecordId,
}

/// A registered account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,

    /// Unique across all users
    pub email: String,

    /// Argon2id digest (never plaintext)
    ///
    /// Documents in the legacy layout hold bcrypt digests under `password`.
    /// They load, but never verify against the Argon2 codec, so those
    /// accounts cannot log in until their password is set again.
    #[serde(alias = "password")]
    pub password_digest: String,

    /// Paid tier flag, only ever set by the upgrade operation
    #[serde(default, alias = "is_chirpy_red")]
    pub is_upgraded: bool,
}

/// A long-lived credential exchanged for access tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    pub user_id: RecordId,

    /// Opaque high-entropy value handed to the client
    pub token: String,

    pub expires_at: DateTime<Utc>,
}

impl RefreshToken {
    /// A token expiring exactly at `now` is still accepted
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// Highest id ever handed out per collection
///
/// Kept alongside the maps so deleting the newest record never frees its id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequences {
    #[serde(default)]
    pub posts: RecordId,

    #[serde(default)]
    pub users: RecordId,
}

/// The whole persisted state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, alias = "chirps")]
    pub posts: BTreeMap<RecordId, Post>,

    #[serde(default)]
    pub users: BTreeMap<RecordId, User>,

    /// Keyed by owning user id
    #[serde(default)]
    pub refresh_tokens: BTreeMap<RecordId, RefreshToken>,

    #[serde(default)]
    pub sequences: Sequences,
}

impl Document {
    /// Empty document with all three collections present
    pub fn empty() -> Self {
        Self::default()
    }

    /// Allocate the next post id
    pub fn next_post_id(&mut self) -> RecordId {
        let id = next_id(self.sequences.posts, self.posts.keys().next_back().copied());
        self.sequences.posts = id;
        id
    }

    /// Allocate the next user id
    pub fn next_user_id(&mut self) -> RecordId {
        let id = next_id(self.sequences.users, self.users.keys().next_back().copied());
        self.sequences.users = id;
        id
    }

    pub fn find_user_by_email(&self, email: &str) -> Option<&User> {
        self.users.values().find(|u| u.email == email)
    }
}

/// Documents written before sequences existed fall back to the highest key
fn next_id(sequence: RecordId, max_key: Option<RecordId>) -> RecordId {
    sequence.max(max_key.unwrap_or(0)) + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn post(id: RecordId) -> Post {
        Post {
            id,
            body: format!("post {}", id),
            author_id: 1,
        }
    }

    #[test]
    fn test_empty_document_serializes_all_collections() {
        let json = serde_json::to_value(Document::empty()).unwrap();
        assert!(json["posts"].as_object().unwrap().is_empty());
        assert!(json["users"].as_object().unwrap().is_empty());
        assert!(json["refresh_tokens"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_post_ids_never_reused_after_deleting_newest() {
        let mut doc = Document::empty();
        let first = doc.next_post_id();
        doc.posts.insert(first, post(first));
        let second = doc.next_post_id();
        doc.posts.insert(second, post(second));

        doc.posts.remove(&second);
        let third = doc.next_post_id();

        assert_eq!((first, second, third), (1, 2, 3));
    }

    #[test]
    fn test_legacy_document_without_sequences() {
        let raw = r#"{
            "chirps": {"4": {"id": 4, "body": "hi", "author_id": 2}},
            "users": {"2": {"id": 2, "email": "a@b.c", "password": "$argon2id$x", "is_chirpy_red": true}},
            "refresh_tokens": {}
        }"#;

        let mut doc: Document = serde_json::from_str(raw).unwrap();

        assert_eq!(doc.posts[&4].body, "hi");
        assert!(doc.users[&2].is_upgraded);
        assert_eq!(doc.users[&2].password_digest, "$argon2id$x");
        assert_eq!(doc.next_post_id(), 5);
        assert_eq!(doc.next_user_id(), 3);
    }

    #[test]
    fn test_refresh_token_expiry_boundary() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let token = RefreshToken {
            user_id: 1,
            token: "t".to_string(),
            expires_at: at,
        };

        assert!(!token.is_expired(at));
        assert!(token.is_expired(at + chrono::Duration::seconds(1)));
    }
}
