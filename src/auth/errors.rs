//! # Auth Errors
//!
//! Error types for the login / refresh / revoke flows.

use thiserror::Error;

use crate::store::StoreError;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password (generic - don't leak which)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Refresh token does not exist
    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    /// Refresh token is past its expiry
    #[error("Refresh token expired")]
    RefreshTokenExpired,

    /// Underlying store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            AuthError::RefreshTokenExpired => "REFRESH_TOKEN_EXPIRED",
            AuthError::Store(e) => e.code(),
        }
    }

    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            // 401 Unauthorized
            AuthError::InvalidCredentials => 401,
            AuthError::InvalidRefreshToken => 401,
            AuthError::RefreshTokenExpired => 401,

            AuthError::Store(e) => e.status_code(),
        }
    }

    /// Returns whether this error should be logged at warn level
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}
