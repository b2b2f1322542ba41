//! # Refresh Tokens
//!
//! Long-lived credentials keyed by owning user id and found by value.
//! Issuing for a user replaces that user's previous token. Expired tokens
//! stay in the document until [`RefreshTokenManager::purge_expired`] runs.

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info};

use crate::auth::crypto::{constant_time_str_eq, generate_token};
use crate::clock::{Clock, SystemClock};
use crate::store::{Document, Entity, RecordId, RecordStore, RefreshToken, StoreError, StoreResult};

/// Default refresh token lifetime in days
pub const DEFAULT_TTL_DAYS: i64 = 60;

/// Longest accepted lifetime (about a century)
pub const MAX_TTL_DAYS: i64 = 36_500;

pub struct RefreshTokenManager {
    store: Arc<RecordStore>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl RefreshTokenManager {
    pub fn new(store: Arc<RecordStore>, ttl: Duration) -> Self {
        Self::with_clock(store, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<RecordStore>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { store, ttl, clock }
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Issue a fresh token for `user_id`, replacing any earlier one
    pub fn issue(&self, user_id: RecordId) -> StoreResult<RefreshToken> {
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(self.ttl)
            .ok_or(StoreError::ExpiryOutOfRange)?;

        let token = RefreshToken {
            user_id,
            token: generate_token(),
            expires_at,
        };

        let issued = token.clone();
        self.store.mutate_with(move |doc| {
            doc.refresh_tokens.insert(user_id, issued);
            Ok(())
        })?;

        info!(user_id, expires_at = %token.expires_at, "refresh token issued");
        Ok(token)
    }

    /// Find a token record by its value, expired or not
    pub fn lookup(&self, token: &str) -> StoreResult<RefreshToken> {
        let doc = self.store.read()?;
        let found = find_key(&doc, token)
            .and_then(|key| doc.refresh_tokens.get(&key).cloned())
            .ok_or_else(|| StoreError::not_found(Entity::RefreshToken, redact(token)))?;

        debug!(user_id = found.user_id, "refresh token found");
        Ok(found)
    }

    /// Delete the record holding `token`
    pub fn revoke(&self, token: &str) -> StoreResult<()> {
        let user_id = self.store.mutate_with(|doc| {
            let key = find_key(doc, token)
                .ok_or_else(|| StoreError::not_found(Entity::RefreshToken, redact(token)))?;
            doc.refresh_tokens.remove(&key);
            Ok(key)
        })?;

        info!(user_id, "refresh token revoked");
        Ok(())
    }

    /// Delete every token whose expiry has passed; returns how many went
    pub fn purge_expired(&self) -> StoreResult<usize> {
        let now = self.clock.now();
        let removed = self.store.mutate_with(|doc| {
            let before = doc.refresh_tokens.len();
            doc.refresh_tokens.retain(|_, t| !t.is_expired(now));
            Ok(before - doc.refresh_tokens.len())
        })?;

        info!(removed, "expired refresh tokens purged");
        Ok(removed)
    }
}

/// Linear scan; compares every entry so timing does not reveal a match position
fn find_key(doc: &Document, token: &str) -> Option<RecordId> {
    doc.refresh_tokens
        .iter()
        .fold(None, |found, (key, record)| {
            if constant_time_str_eq(&record.token, token) {
                Some(*key)
            } else {
                found
            }
        })
}

/// Keep token values out of logs and error messages
fn redact(token: &str) -> String {
    let prefix: String = token.chars().take(6).collect();
    format!("{}...", prefix)
}
