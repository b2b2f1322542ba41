//! # Users
//!
//! Account records. Passwords are hashed before the document lock is taken;
//! the email uniqueness check and the insert share one critical section.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::auth::crypto::{Argon2Codec, CredentialCodec};
use crate::store::{Entity, RecordId, RecordStore, StoreError, StoreResult, User};

/// Billing webhook event that upgrades an account
pub const UPGRADE_EVENT: &str = "user.upgraded";

pub struct UsersManager<C: CredentialCodec = Argon2Codec> {
    store: Arc<RecordStore>,
    codec: C,
}

impl UsersManager<Argon2Codec> {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self::with_codec(store, Argon2Codec)
    }
}

impl<C: CredentialCodec> UsersManager<C> {
    pub fn with_codec(store: Arc<RecordStore>, codec: C) -> Self {
        Self { store, codec }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Register a new account
    ///
    /// Fails with `AlreadyExists` if the email is taken; the document is
    /// left unchanged in that case.
    pub fn create(&self, email: &str, password: &str) -> StoreResult<User> {
        let password_digest = self.codec.hash(password)?;

        let user = self.store.mutate_with(|doc| {
            if doc.find_user_by_email(email).is_some() {
                return Err(StoreError::AlreadyExists(email.to_string()));
            }

            let id = doc.next_user_id();
            let user = User {
                id,
                email: email.to_string(),
                password_digest,
                is_upgraded: false,
            };
            doc.users.insert(id, user.clone());
            Ok(user)
        });

        match &user {
            Ok(u) => info!(user_id = u.id, "user created"),
            Err(e) => warn!(error = %e, "user creation rejected"),
        }
        user
    }

    pub fn get_by_id(&self, id: RecordId) -> StoreResult<User> {
        self.store
            .read()?
            .users
            .remove(&id)
            .ok_or_else(|| StoreError::not_found(Entity::User, id))
    }

    pub fn get_by_email(&self, email: &str) -> StoreResult<User> {
        let doc = self.store.read()?;
        let user = doc
            .find_user_by_email(email)
            .cloned()
            .ok_or_else(|| StoreError::not_found(Entity::User, email))?;

        debug!(user_id = user.id, "user found by email");
        Ok(user)
    }

    /// Replace the stored record with `user`, keyed by its id
    ///
    /// `is_upgraded` keeps its stored value. Moving to an email held by
    /// another account fails with `AlreadyExists`.
    pub fn update(&self, user: User) -> StoreResult<User> {
        let updated = self.store.mutate_with(|doc| {
            if let Some(other) = doc.find_user_by_email(&user.email) {
                if other.id != user.id {
                    return Err(StoreError::AlreadyExists(user.email.clone()));
                }
            }

            let existing = doc
                .users
                .get_mut(&user.id)
                .ok_or_else(|| StoreError::not_found(Entity::User, user.id))?;

            *existing = User {
                is_upgraded: existing.is_upgraded,
                ..user
            };
            Ok(existing.clone())
        })?;

        info!(user_id = updated.id, "user updated");
        Ok(updated)
    }

    /// Replace email and password, hashing the new password
    pub fn update_credentials(
        &self,
        id: RecordId,
        email: &str,
        password: &str,
    ) -> StoreResult<User> {
        let password_digest = self.codec.hash(password)?;
        self.update(User {
            id,
            email: email.to_string(),
            password_digest,
            is_upgraded: false,
        })
    }

    /// Flip the paid-tier flag on
    pub fn upgrade(&self, id: RecordId) -> StoreResult<User> {
        let user = self.store.mutate_with(|doc| {
            let user = doc
                .users
                .get_mut(&id)
                .ok_or_else(|| StoreError::not_found(Entity::User, id))?;
            user.is_upgraded = true;
            Ok(user.clone())
        })?;

        info!(user_id = id, "user upgraded");
        Ok(user)
    }

    /// Apply a billing webhook event
    ///
    /// Returns `None` for events that carry no account change.
    pub fn apply_billing_event(&self, event: &str, user_id: RecordId) -> StoreResult<Option<User>> {
        if event != UPGRADE_EVENT {
            debug!(event, "billing event ignored");
            return Ok(None);
        }
        self.upgrade(user_id).map(Some)
    }
}
