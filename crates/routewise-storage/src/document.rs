// SPDX-FileCopyrightText: 2026 Routewise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Whole-document JSON persistence.
//!
//! Documents are read whole under a shared lock and replaced whole under an
//! exclusive lock by writing a temp file in the same directory and renaming
//! it into place. [`JsonDocument::update`] performs read, edit and rewrite in
//! one exclusive-lock scope so concurrent processes cannot interleave.

use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::time::Duration;

use routewise_core::RoutewiseError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::lock::{DEFAULT_LOCK_TIMEOUT, LockMode, ScopedLock};

/// A typed JSON document stored at a fixed path.
#[derive(Debug, Clone)]
pub struct JsonDocument<T> {
    path: PathBuf,
    lock_timeout: Duration,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonDocument<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            _marker: PhantomData,
        }
    }

    /// How long each operation waits for a contended lock.
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document under a shared lock.
    ///
    /// A missing file yields `T::default()`; an undecodable file is
    /// reported as [`RoutewiseError::Corrupt`].
    pub fn load(&self) -> Result<T, RoutewiseError> {
        let _guard = self.lock(LockMode::Shared)?;
        self.read_unlocked()
    }

    /// Like [`load`](Self::load) but any failure reads as the default value.
    pub fn load_or_default(&self) -> T {
        match self.load() {
            Ok(doc) => doc,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "document unreadable, using default");
                T::default()
            }
        }
    }

    /// Replace the document under an exclusive lock.
    pub fn save(&self, value: &T) -> Result<(), RoutewiseError> {
        let _guard = self.lock(LockMode::Exclusive)?;
        self.write_unlocked(value)
    }

    /// Read, edit and rewrite the document in a single exclusive-lock scope.
    ///
    /// A corrupt document is replaced by `T::default()` before `edit` runs.
    pub fn update<R>(&self, edit: impl FnOnce(&mut T) -> R) -> Result<R, RoutewiseError> {
        let _guard = self.lock(LockMode::Exclusive)?;
        let mut doc = match self.read_unlocked() {
            Ok(doc) => doc,
            Err(err @ RoutewiseError::Corrupt { .. }) => {
                warn!(path = %self.path.display(), error = %err, "discarding corrupt document");
                T::default()
            }
            Err(err) => return Err(err),
        };
        let out = edit(&mut doc);
        self.write_unlocked(&doc)?;
        Ok(out)
    }

    /// Delete the document. Missing files are not an error.
    pub fn remove(&self) -> Result<(), RoutewiseError> {
        let _guard = self.lock(LockMode::Exclusive)?;
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(RoutewiseError::storage(err)),
        }
    }

    fn lock(&self, mode: LockMode) -> Result<ScopedLock, RoutewiseError> {
        ScopedLock::acquire(&self.path, mode, self.lock_timeout)
    }

    fn read_unlocked(&self) -> Result<T, RoutewiseError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "document missing, starting empty");
                return Ok(T::default());
            }
            Err(err) => return Err(RoutewiseError::storage(err)),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(T::default());
        }
        serde_json::from_slice(&bytes).map_err(|source| RoutewiseError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write_unlocked(&self, value: &T) -> Result<(), RoutewiseError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(RoutewiseError::storage)?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(RoutewiseError::storage)?;
        serde_json::to_writer_pretty(&mut tmp, value).map_err(RoutewiseError::storage)?;
        tmp.write_all(b"\n").map_err(RoutewiseError::storage)?;
        tmp.as_file().sync_all().map_err(RoutewiseError::storage)?;
        tmp.persist(&self.path)
            .map_err(|e| RoutewiseError::storage(e.error))?;
        Ok(())
    }
}
