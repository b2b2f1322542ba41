//! # Auth Module
//!
//! Password digests, refresh token generation and the login / refresh /
//! revoke flows built on the collection managers.

pub mod crypto;
pub mod errors;
pub mod session;

pub use crypto::{Argon2Codec, CredentialCodec};
pub use errors::{AuthError, AuthResult};
pub use session::SessionService;
