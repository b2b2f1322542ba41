//! # Store Module
//!
//! The persisted document, its entity types and the lock-guarded
//! single-file store every collection manager is built on.

pub mod document;
pub mod errors;
pub mod record_store;

pub use document::{Document, Post, RecordId, RefreshToken, Sequences, User};
pub use errors::{Entity, StoreError, StoreResult};
pub use record_store::RecordStore;
