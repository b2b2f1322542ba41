//! chirpstore - persistent, concurrency-safe record store for a small
//! social-posting service
//!
//! Posts, users and refresh tokens live in one JSON document guarded by a
//! reader-writer lock. Every write is a single load-modify-persist cycle.

pub mod auth;
pub mod cli;
pub mod clock;
pub mod collections;
pub mod config;
pub mod content;
pub mod observability;
pub mod store;

pub use collections::Collections;
pub use config::StoreConfig;
pub use store::{RecordStore, StoreError, StoreResult};
