//! Single-instance guard backed by an exclusively locked file

use crate::paths::ensure_private_dir;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use todo_daemon_core::{Error, Result};

/// An exclusive, process-scoped lock on a well-known file.
///
/// The lock is tied to the open file description, so the operating system
/// releases it when the holder dies; there are no stale locks to break.
#[derive(Debug)]
pub struct ProcessLock {
    lock_file: Option<File>,
    lock_path: PathBuf,
    pid: u32,
}

impl ProcessLock {
    /// Try to claim the lock without blocking.
    ///
    /// Returns `Error::AlreadyRunning` when another holder has it.
    pub fn try_acquire(lock_path: &Path) -> Result<Self> {
        if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_private_dir(parent)
                .map_err(|e| Error::file_system(parent, "create lock directory", e))?;
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(lock_path)
            .map_err(|e| Error::file_system(lock_path, "open lock file", e))?;

        match lock_file.try_lock_exclusive() {
            Ok(()) => {
                // Record the holder for humans poking at the runtime dir
                let pid = std::process::id();
                lock_file
                    .set_len(0)
                    .and_then(|()| writeln!(lock_file, "{pid}"))
                    .and_then(|()| lock_file.sync_all())
                    .map_err(|e| Error::file_system(lock_path, "write lock file", e))?;

                tracing::debug!(path = %lock_path.display(), pid, "acquired process lock");

                Ok(Self {
                    lock_file: Some(lock_file),
                    lock_path: lock_path.to_path_buf(),
                    pid,
                })
            }
            Err(e) if is_contended(&e) => Err(Error::already_running(lock_path)),
            Err(e) => Err(Error::file_system(lock_path, "lock", e)),
        }
    }

    /// Get the path of the lock file
    pub fn path(&self) -> &Path {
        &self.lock_path
    }

    /// Get the PID that owns this lock
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Release the lock explicitly, reporting failures to the caller
    pub fn release(mut self) -> Result<()> {
        match self.lock_file.take() {
            Some(file) => FileExt::unlock(&file)
                .map_err(|e| Error::file_system(&self.lock_path, "unlock", e)),
            None => Ok(()),
        }
    }
}

impl Drop for ProcessLock {
    fn drop(&mut self) {
        if let Some(file) = self.lock_file.take() {
            if let Err(e) = FileExt::unlock(&file) {
                tracing::warn!(
                    path = %self.lock_path.display(),
                    error = %e,
                    "cannot release process lock"
                );
            }
        }
    }
}

fn is_contended(error: &io::Error) -> bool {
    error.kind() == io::ErrorKind::WouldBlock
        || error.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}
