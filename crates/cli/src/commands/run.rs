use todo_daemon_core::Result;
use todo_daemon_server::{launcher, DaemonConfig};
use tokio_util::sync::CancellationToken;

/// Run the daemon until `shutdown` is cancelled
pub async fn execute(config: DaemonConfig, shutdown: CancellationToken) -> Result<()> {
    tracing::info!(
        sock_file = %config.sock_file.display(),
        lock_file = %config.lock_file.display(),
        "Starting to-do daemon"
    );
    launcher::run(config, shutdown).await?;
    tracing::info!("To-do daemon stopped");
    Ok(())
}
