//! # Record Store
//!
//! Owns the JSON document on disk and serializes access to it.
//!
//! ## Invariants
//! - Reads run concurrently; a mutation excludes every other read and mutation
//! - A mutation holds the exclusive lock for the whole load-apply-persist cycle
//! - A failed mutation persists nothing
//! - Readers never observe a partially written document (temp file + rename)
//!
//! The lock is per instance: open one store per document path and share it.
//! Each persist writes its own uniquely named temp file, so a second instance
//! cannot corrupt the file, though it can overwrite the first one's changes.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::document::Document;
use super::errors::{StoreError, StoreResult};

/// Single-file document store guarded by a reader-writer lock
///
/// Construct once and share it (`Arc<RecordStore>`) with every manager.
#[derive(Debug)]
pub struct RecordStore {
    /// Path to the document
    path: PathBuf,

    /// Guards the file, not an in-memory copy
    lock: RwLock<()>,
}

impl RecordStore {
    /// Open the store at `path`, creating an empty document if none exists.
    ///
    /// Existing content is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::StorageIo` if the path cannot be created or written.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        if path.file_name().is_none() {
            return Err(StoreError::io(
                &path,
                io::Error::new(io::ErrorKind::InvalidInput, "document path has no file name"),
            ));
        }

        let store = Self {
            path,
            lock: RwLock::new(()),
        };
        store.initialize()?;
        Ok(store)
    }

    /// Path of the persisted document
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn initialize(&self) -> StoreResult<()> {
        let _guard = self.write_lock()?;

        match fs::metadata(&self.path) {
            Ok(_) => {
                debug!(path = %self.path.display(), "document already present");
                return Ok(());
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(StoreError::io(&self.path, e)),
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
            }
        }

        self.persist(&Document::empty())?;
        info!(path = %self.path.display(), "created empty document");
        Ok(())
    }

    /// Load the current document under the shared lock.
    pub fn read(&self) -> StoreResult<Document> {
        let _guard = self.read_lock()?;
        self.load()
    }

    /// Replace the document with the result of `apply`.
    ///
    /// Returns the document as persisted.
    pub fn mutate<F>(&self, apply: F) -> StoreResult<Document>
    where
        F: FnOnce(Document) -> StoreResult<Document>,
    {
        let _guard = self.write_lock()?;
        let next = apply(self.load()?)?;
        self.persist(&next)?;
        Ok(next)
    }

    /// Edit the document in place and return a value computed by `apply`.
    ///
    /// The edited document is persisted only when `apply` returns `Ok`.
    pub fn mutate_with<T, F>(&self, apply: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Document) -> StoreResult<T>,
    {
        let _guard = self.write_lock()?;
        let mut document = self.load()?;
        let out = apply(&mut document)?;
        self.persist(&document)?;
        Ok(out)
    }

    /// Discard every record.
    pub fn reset(&self) -> StoreResult<()> {
        let _guard = self.write_lock()?;
        self.persist(&Document::empty())?;
        info!(path = %self.path.display(), "document reset");
        Ok(())
    }

    fn load(&self) -> StoreResult<Document> {
        let bytes = fs::read(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Decode {
            path: self.path.clone(),
            source,
        })
    }

    /// Write a fresh temp file beside the document, fsync, then rename over it.
    ///
    /// The temp file is removed on every error path.
    fn persist(&self, document: &Document) -> StoreResult<()> {
        let bytes = serde_json::to_vec(document).map_err(StoreError::Encode)?;
        let dir = self.parent_dir();

        let mut temp = NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))?;
        temp.write_all(&bytes)
            .map_err(|e| StoreError::io(temp.path(), e))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| StoreError::io(temp.path(), e))?;

        temp.persist(&self.path).map_err(|e| {
            warn!(path = %self.path.display(), error = %e.error, "rename over document failed");
            StoreError::io(&self.path, e.error)
        })?;

        // fsync the directory so the rename itself is durable
        if let Ok(handle) = File::open(dir) {
            let _ = handle.sync_all();
        }

        debug!(path = %self.path.display(), bytes = bytes.len(), "document persisted");
        Ok(())
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn read_lock(&self) -> StoreResult<RwLockReadGuard<'_, ()>> {
        self.lock.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write_lock(&self) -> StoreResult<RwLockWriteGuard<'_, ()>> {
        self.lock.write().map_err(|_| StoreError::LockPoisoned)
    }
}
