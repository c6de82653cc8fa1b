use todo_daemon_core::TODO_DAEMON_LOG_VAR;
use tracing::{span, Level, Span};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing system
///
/// The filter comes from `TODO_DAEMON_LOG`, then `RUST_LOG`, then defaults to
/// `info`. Everything is written to stderr so that command output on stdout
/// stays machine readable.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(is_tty())
        .compact()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(TODO_DAEMON_LOG_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Check if we're running in a TTY environment
fn is_tty() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stderr())
}

/// Create the span a daemon instance logs under
pub fn daemon_span(pid: u32) -> Span {
    span!(Level::INFO, "daemon", pid = pid)
}

/// Create a span for one accepted connection
pub fn connection_span(protocol: &'static str, peer: &str) -> Span {
    span!(Level::DEBUG, "connection", protocol = protocol, peer = %peer)
}
