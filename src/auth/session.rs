//! # Session Flows
//!
//! Login, refresh and revoke, composed from the users and refresh token
//! managers. Access token minting stays with the caller: `refresh` hands
//! back the validated record so the caller can sign for its `user_id`.
//!
//! ## Invariants
//! - Unknown email and wrong password are indistinguishable
//! - Expired refresh tokens are rejected on every use

use tracing::{info, warn};

use super::crypto::CredentialCodec;
use super::errors::{AuthError, AuthResult};
use crate::collections::{RefreshTokenManager, UsersManager};
use crate::store::{RefreshToken, StoreError, User};

/// Session flows over borrowed managers
pub struct SessionService<'a, C: CredentialCodec> {
    users: &'a UsersManager<C>,
    tokens: &'a RefreshTokenManager,
}

impl<'a, C: CredentialCodec> SessionService<'a, C> {
    pub fn new(users: &'a UsersManager<C>, tokens: &'a RefreshTokenManager) -> Self {
        Self { users, tokens }
    }

    /// Check credentials and issue a refresh token
    pub fn login(&self, email: &str, password: &str) -> AuthResult<(User, RefreshToken)> {
        let user = match self.users.get_by_email(email) {
            Ok(user) => user,
            Err(StoreError::NotFound { .. }) => {
                warn!("login rejected");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(e.into()),
        };

        if !self.users.codec().verify(&user.password_digest, password) {
            warn!("login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id)?;
        info!(user_id = user.id, "login succeeded");
        Ok((user, token))
    }

    /// Validate a refresh token; the caller mints an access token for its user
    pub fn refresh(&self, token: &str) -> AuthResult<RefreshToken> {
        let record = match self.tokens.lookup(token) {
            Ok(record) => record,
            Err(StoreError::NotFound { .. }) => return Err(AuthError::InvalidRefreshToken),
            Err(e) => return Err(e.into()),
        };

        if record.is_expired(self.tokens.clock().now()) {
            warn!(user_id = record.user_id, "expired refresh token presented");
            return Err(AuthError::RefreshTokenExpired);
        }

        Ok(record)
    }

    /// Validate then delete a refresh token
    pub fn revoke(&self, token: &str) -> AuthResult<()> {
        let record = self.refresh(token)?;
        match self.tokens.revoke(&record.token) {
            Ok(()) => Ok(()),
            // Revoked concurrently between validation and delete
            Err(StoreError::NotFound { .. }) => Err(AuthError::InvalidRefreshToken),
            Err(e) => Err(e.into()),
        }
    }
}
