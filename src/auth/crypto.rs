//! # Cryptographic Utilities
//!
//! Password digests and refresh token generation.
//!
//! ## Invariants
//! - Passwords are only stored as Argon2id digests
//! - Verification never reports *why* it failed
//! - Secrets are compared in constant time

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::RngCore;
use subtle::ConstantTimeEq;

use crate::store::{StoreError, StoreResult};

/// Number of random bytes in a refresh token (256 bits)
pub const TOKEN_BYTES: usize = 32;

/// One-way password digest capability
pub trait CredentialCodec: Send + Sync {
    /// Produce a salted digest of `secret`
    fn hash(&self, secret: &str) -> StoreResult<String>;

    /// True iff `candidate` hashes to `digest`; internal errors count as a mismatch
    fn verify(&self, digest: &str, candidate: &str) -> bool;
}

/// Argon2id with the crate's default parameters
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Codec;

impl CredentialCodec for Argon2Codec {
    fn hash(&self, secret: &str) -> StoreResult<String> {
        hash_password(secret)
    }

    fn verify(&self, digest: &str, candidate: &str) -> bool {
        verify_password(candidate, digest)
    }
}

/// Hash a password using Argon2id
pub fn hash_password(password: &str) -> StoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| StoreError::HashingFailed)
}

/// Verify a password against its digest
///
/// A malformed digest is treated as a wrong password.
pub fn verify_password(password: &str, digest: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(digest) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Generate a cryptographically secure random token
///
/// Returns a 256-bit random value as URL-safe base64.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, bytes)
}

/// Constant-time comparison of two strings
pub fn constant_time_str_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
