use clap::Parser;
use todo_daemon::Cli;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    if let Err(e) = todo_daemon_utils::tracing::init() {
        eprintln!("Failed to initialize logging: {e}");
    }

    // Parse command-line arguments
    let cli = Cli::parse();

    // Signals and explicit stops share one token
    let shutdown = CancellationToken::new();
    spawn_signal_handler(shutdown.clone());

    cli.command.execute(cli.sock, shutdown).await?;
    Ok(())
}

fn spawn_signal_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            let mut terminate = match signal(SignalKind::terminate()) {
                Ok(terminate) => terminate,
                Err(e) => {
                    tracing::warn!(error = %e, "Cannot listen for SIGTERM");
                    if tokio::signal::ctrl_c().await.is_ok() {
                        shutdown.cancel();
                    }
                    return;
                }
            };
            tokio::select! {
                _ = tokio::signal::ctrl_c() => tracing::info!("Received SIGINT"),
                _ = terminate.recv() => tracing::info!("Received SIGTERM"),
            }
        }

        #[cfg(not(unix))]
        {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            tracing::info!("Received Ctrl+C");
        }

        shutdown.cancel();
    });
}
