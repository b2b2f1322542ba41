//! # Content Module
//!
//! Rules applied to post bodies before they are stored.

pub mod validator;

pub use validator::{validate, ContentPolicy, MASK, MAX_POST_CHARS, REDACTED_TERMS};
