// SPDX-FileCopyrightText: 2026 Routewise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scoped shared/exclusive access to a named file resource.
//!
//! Locks are advisory `flock`-style locks (via `fs2`) taken on a sidecar
//! `<resource>.lock` file, never on the resource itself, so the resource can
//! be atomically replaced by rename while the lock is held. The lock is
//! released when the guard drops, on every exit path.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fs2::FileExt;
use routewise_core::RoutewiseError;
use tracing::{debug, warn};

/// How long to wait for a contended lock before giving up.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(2);

const RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// Lock mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// Many readers at once.
    Shared,
    /// Single writer.
    Exclusive,
}

/// Guard holding an advisory lock on a resource's sidecar lock file.
#[derive(Debug)]
pub struct ScopedLock {
    file: File,
    lock_path: PathBuf,
    mode: LockMode,
}

impl ScopedLock {
    /// Acquire a lock, polling until `timeout` elapses.
    ///
    /// Contention past the timeout surfaces as [`RoutewiseError::Lock`] rather
    /// than blocking indefinitely. Polling sleeps the calling thread.
    pub fn acquire(
        resource: &Path,
        mode: LockMode,
        timeout: Duration,
    ) -> Result<Self, RoutewiseError> {
        let lock_path = lock_path_for(resource);
        if let Some(parent) = lock_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| RoutewiseError::Lock {
                path: lock_path.clone(),
                source,
            })?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|source| RoutewiseError::Lock {
                path: lock_path.clone(),
                source,
            })?;

        let deadline = Instant::now() + timeout;
        loop {
            let attempt = match mode {
                LockMode::Shared => FileExt::try_lock_shared(&file),
                LockMode::Exclusive => FileExt::try_lock_exclusive(&file),
            };
            match attempt {
                Ok(()) => {
                    debug!(path = %lock_path.display(), ?mode, "lock acquired");
                    return Ok(Self {
                        file,
                        lock_path,
                        mode,
                    });
                }
                Err(err) if is_contended(&err) && Instant::now() < deadline => {
                    std::thread::sleep(RETRY_INTERVAL);
                }
                Err(source) => {
                    warn!(path = %lock_path.display(), ?mode, error = %source, "lock not acquired");
                    return Err(RoutewiseError::Lock {
                        path: lock_path,
                        source,
                    });
                }
            }
        }
    }

    /// Path of the sidecar lock file.
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    pub fn mode(&self) -> LockMode {
        self.mode
    }
}

impl Drop for ScopedLock {
    fn drop(&mut self) {
        if let Err(err) = FileExt::unlock(&self.file) {
            warn!(path = %self.lock_path.display(), error = %err, "failed to release lock");
        }
    }
}

/// Sidecar lock path for a resource: `cache.json` -> `cache.json.lock`.
pub fn lock_path_for(resource: &Path) -> PathBuf {
    let mut name = resource.as_os_str().to_os_string();
    name.push(".lock");
    PathBuf::from(name)
}

fn is_contended(err: &std::io::Error) -> bool {
    err.kind() == std::io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}
