//! Daemon start sequence: lock, serve, drain, unlock

use crate::address::RpcAddress;
use crate::config::DaemonConfig;
use crate::server::DualProtocolServer;
use std::path::Path;
use todo_daemon_core::{Error, Result, ResultExt};
use todo_daemon_utils::ProcessLock;
use tokio_util::sync::CancellationToken;

/// Run the daemon until `shutdown` is cancelled or the server fails.
///
/// Fails right away with `AlreadyRunning` if another daemon holds the lock.
/// Problems that occur while shutting down are only logged.
pub async fn run(config: DaemonConfig, shutdown: CancellationToken) -> Result<()> {
    let lock = ProcessLock::try_acquire(&config.lock_file).context("cannot start server")?;
    tracing::info!(lock_file = %lock.path().display(), pid = lock.pid(), "Acquired process lock");

    let result = serve_until_shutdown(&config, &shutdown).await;

    if let Err(e) = lock.release() {
        tracing::warn!(error = %e, "Failed to release process lock");
    }
    result
}

async fn serve_until_shutdown(config: &DaemonConfig, shutdown: &CancellationToken) -> Result<()> {
    let address = prepare_socket(&config.sock_file)?;
    let server = DualProtocolServer::new(config.server.clone());
    let handle = server.handle();

    let serve = server.serve(&address);
    tokio::pin!(serve);

    let finished = tokio::select! {
        result = &mut serve => Some(result),
        _ = shutdown.cancelled() => None,
    };
    if let Some(result) = finished {
        return result.context("server terminated");
    }

    tracing::info!("Shutting down");
    let stop = async {
        match config.drain_timeout() {
            Some(limit) => {
                if tokio::time::timeout(limit, handle.graceful_stop()).await.is_err() {
                    tracing::warn!(limit = ?limit, "Drain deadline passed, stopping immediately");
                    handle.stop().await;
                }
            }
            None => handle.graceful_stop().await,
        }
    };
    let (result, ()) = tokio::join!(serve, stop);

    if let Err(e) = result {
        tracing::warn!(error = %e, "Error while shutting down");
    }
    Ok(())
}

/// Make sure the socket directory exists and no stale socket is in the way.
///
/// Only called while holding the process lock, so an existing socket file
/// cannot belong to a live daemon.
#[cfg(unix)]
fn prepare_socket(sock_file: &Path) -> Result<RpcAddress> {
    if let Some(parent) = sock_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        todo_daemon_utils::ensure_private_dir(parent)
            .map_err(|e| Error::file_system(parent, "create socket directory", e))?;
    }

    match std::fs::remove_file(sock_file) {
        Ok(()) => tracing::debug!(sock_file = %sock_file.display(), "Removed stale socket"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(Error::file_system(sock_file, "remove stale socket", e)),
    }

    Ok(RpcAddress::Unix(sock_file.to_path_buf()))
}

#[cfg(not(unix))]
fn prepare_socket(sock_file: &Path) -> Result<RpcAddress> {
    Err(Error::configuration(format!(
        "cannot listen on '{}': local sockets are not supported on this platform",
        sock_file.display()
    )))
}
