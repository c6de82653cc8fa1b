//! Default locations of the daemon's runtime files
//!
//! These are only defaults: the daemon and its clients receive the paths
//! through their configuration and never compute them on their own.

use std::io;
use std::path::{Path, PathBuf};
use todo_daemon_core::{LOCK_FILE_NAME, SOCK_FILE_NAME};

/// Get the per-user runtime directory
///
/// - `$XDG_RUNTIME_DIR` when set
/// - Unix: `/run/user/$UID`
/// - otherwise the system temp directory
pub fn runtime_dir() -> PathBuf {
    if let Some(dir) = dirs::runtime_dir() {
        return dir;
    }

    #[cfg(unix)]
    {
        PathBuf::from("/run/user").join(users::get_current_uid().to_string())
    }

    #[cfg(not(unix))]
    {
        std::env::temp_dir()
    }
}

/// Get the default path of the single-instance lock file
pub fn default_lock_file() -> PathBuf {
    runtime_dir().join(LOCK_FILE_NAME)
}

/// Get the default path of the RPC socket
pub fn default_sock_file() -> PathBuf {
    runtime_dir().join(SOCK_FILE_NAME)
}

/// Create a directory (and its parents) readable only by the current user
pub fn ensure_private_dir(dir: &Path) -> io::Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }

    builder.create(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_files_share_runtime_dir() {
        let lock = default_lock_file();
        let sock = default_sock_file();
        assert_eq!(lock.parent(), sock.parent());
        assert!(lock.ends_with(LOCK_FILE_NAME));
        assert!(sock.ends_with(SOCK_FILE_NAME));
    }

    #[test]
    fn test_ensure_private_dir_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("a").join("b");

        ensure_private_dir(&dir).unwrap();
        ensure_private_dir(&dir).unwrap();
        assert!(dir.is_dir());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&dir).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o700);
        }
    }
}
