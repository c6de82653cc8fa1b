//! Two-stage shutdown signalling shared by both accept loops

use tokio_util::sync::CancellationToken;

/// Graceful and immediate stop requests.
///
/// Requesting an immediate stop implies a graceful one, so loops that only
/// watch for draining still stop accepting.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    graceful: CancellationToken,
    immediate: CancellationToken,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop accepting new work, let in-flight work finish
    pub fn drain(&self) {
        self.graceful.cancel();
    }

    /// Stop accepting and abandon in-flight work
    pub fn abort(&self) {
        self.graceful.cancel();
        self.immediate.cancel();
    }

    /// Resolves once a graceful (or immediate) stop was requested
    pub async fn draining(&self) {
        self.graceful.cancelled().await;
    }

    /// Resolves once an immediate stop was requested
    pub async fn aborted(&self) {
        self.immediate.cancelled().await;
    }
}
