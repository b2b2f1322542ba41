//! # Store Errors
//!
//! Error taxonomy shared by the record store and the collection managers.
//! Errors propagate unchanged from the store to the caller; nothing retries.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Which collection a missing record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Post,
    User,
    RefreshToken,
}

impl Entity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::Post => "post",
            Entity::User => "user",
            Entity::RefreshToken => "refresh token",
        }
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record store errors
#[derive(Debug, Error)]
pub enum StoreError {
    // ==================
    // Lookup Errors
    // ==================

    /// Id, email or token value absent
    #[error("{entity} not found: {key}")]
    NotFound { entity: Entity, key: String },

    /// Email already registered
    #[error("Email already registered: {0}")]
    AlreadyExists(String),

    /// Requester is not the author of the post
    #[error("Post {post_id} is not owned by user {requester_id}")]
    NotAuthor { post_id: u64, requester_id: u64 },

    // ==================
    // Validation Errors
    // ==================

    /// Post body longer than the allowed number of characters
    #[error("Post body is {count} characters long, the limit is {max}")]
    TooLong { count: usize, max: usize },

    /// Password hashing failed
    #[error("Internal error: password hashing failed")]
    HashingFailed,

    /// Token lifetime pushes the expiry past the representable range
    #[error("Internal error: refresh token expiry out of range")]
    ExpiryOutOfRange,

    // ==================
    // Storage Errors
    // ==================

    /// Document file could not be read or written
    #[error("Storage I/O error on {}: {source}", .path.display())]
    StorageIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Persisted document is not well-formed
    #[error("Corrupt document at {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Document could not be serialized
    #[error("Failed to encode document: {0}")]
    Encode(#[source] serde_json::Error),

    /// A thread panicked while holding the document lock
    #[error("Document lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    pub fn not_found(entity: Entity, key: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::StorageIo {
            path: path.into(),
            source,
        }
    }

    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::NotFound { .. } => "NOT_FOUND",
            StoreError::AlreadyExists(_) => "ALREADY_EXISTS",
            StoreError::NotAuthor { .. } => "NOT_AUTHOR",
            StoreError::TooLong { .. } => "TOO_LONG",
            StoreError::HashingFailed => "HASHING_FAILED",
            StoreError::ExpiryOutOfRange => "EXPIRY_OUT_OF_RANGE",
            StoreError::StorageIo { .. } => "STORAGE_IO_ERROR",
            StoreError::Decode { .. } => "DECODE_ERROR",
            StoreError::Encode(_) => "ENCODE_ERROR",
            StoreError::LockPoisoned => "LOCK_POISONED",
        }
    }

    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            StoreError::TooLong { .. } => 400,

            // 403 Forbidden
            StoreError::NotAuthor { .. } => 403,

            // 404 Not Found
            StoreError::NotFound { .. } => 404,

            // 409 Conflict
            StoreError::AlreadyExists(_) => 409,

            // 500 Internal Server Error
            StoreError::HashingFailed
            | StoreError::ExpiryOutOfRange
            | StoreError::StorageIo { .. }
            | StoreError::Decode { .. }
            | StoreError::Encode(_)
            | StoreError::LockPoisoned => 500,
        }
    }

    /// Returns whether this error was caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }

    /// Storage and decode failures leave the document unusable for this process
    pub fn is_unrecoverable(&self) -> bool {
        matches!(
            self,
            StoreError::StorageIo { .. } | StoreError::Decode { .. } | StoreError::LockPoisoned
        )
    }
}
