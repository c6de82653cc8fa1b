//! RPC accept loop and per-connection request handling

use super::provider_handlers::{oversized_request_response, RpcService};
use crate::address::RpcListener;
use crate::shutdown::ShutdownSignal;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use todo_daemon_core::{Error, Result};
use todo_daemon_utils::tracing::connection_span;
use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, WriteHalf,
};
use tokio::time::timeout;
use tokio_util::task::TaskTracker;
use tracing::Instrument;

/// Bounds applied to every RPC connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RpcTimeouts {
    /// How long to wait for the next request line
    pub idle: Duration,
    /// How long writing one response may take
    pub write: Duration,
}

impl Default for RpcTimeouts {
    fn default() -> Self {
        Self {
            idle: Duration::from_secs(60),
            write: Duration::from_secs(10),
        }
    }
}

/// Longest request line a connection may send before it is closed
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 1024 * 1024;

/// Exposes an `RpcService` on a bound listener
pub struct RpcProvider {
    listener: RpcListener,
    service: Arc<RpcService>,
    timeouts: RpcTimeouts,
    max_request_bytes: usize,
}

impl RpcProvider {
    pub fn new(listener: RpcListener, service: Arc<RpcService>, timeouts: RpcTimeouts) -> Self {
        Self {
            listener,
            service,
            timeouts,
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
        }
    }

    #[must_use]
    pub fn with_max_request_bytes(mut self, max_request_bytes: usize) -> Self {
        self.max_request_bytes = max_request_bytes;
        self
    }

    /// Accept connections until shutdown is requested or accepting fails.
    ///
    /// Returns only after every connection handler has finished, or right
    /// away once an immediate stop was requested.
    pub async fn serve(self, shutdown: ShutdownSignal) -> Result<()> {
        let Self {
            listener,
            service,
            timeouts,
            max_request_bytes,
        } = self;
        let endpoint = listener
            .local_address()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "rpc".to_string());
        let tracker = TaskTracker::new();

        tracing::info!(endpoint = %endpoint, "RPC server listening");
        let result = loop {
            tokio::select! {
                biased;
                _ = shutdown.draining() => break Ok(()),
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let service = Arc::clone(&service);
                        let shutdown = shutdown.clone();
                        tracker.spawn(
                            async move {
                                let connection = Connection {
                                    service,
                                    timeouts,
                                    max_request_bytes,
                                    shutdown,
                                };
                                if let Err(e) = connection.handle(stream).await {
                                    tracing::warn!(error = %e, "RPC connection error");
                                }
                            }
                            .instrument(connection_span("rpc", &peer)),
                        );
                    }
                    Err(e) if is_transient(&e) => {
                        tracing::warn!(error = %e, "Failed to accept RPC connection");
                    }
                    Err(e) => {
                        break Err(Error::network(
                            endpoint.clone(),
                            format!("accept failed: {e}"),
                        ))
                    }
                },
            }
        };

        // No new connections from here on
        drop(listener);
        tracker.close();

        tokio::select! {
            _ = tracker.wait() => {
                tracing::debug!(endpoint = %endpoint, "RPC connections drained");
            }
            _ = shutdown.aborted() => {
                tracing::debug!(endpoint = %endpoint, "RPC connections abandoned");
            }
        }
        result
    }
}

fn is_transient(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
    )
}

struct Connection {
    service: Arc<RpcService>,
    timeouts: RpcTimeouts,
    max_request_bytes: usize,
    shutdown: ShutdownSignal,
}

impl Connection {
    /// Serve newline-delimited requests on one connection until it closes
    async fn handle<S>(self, stream: S) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (read_half, mut write_half) = tokio::io::split(stream);
        let mut reader = BufReader::new(read_half);
        let mut line = String::new();
        let limit = self.max_request_bytes;

        loop {
            line.clear();
            // One byte past the limit tells an oversized line from one that fits exactly
            let mut bounded = (&mut reader).take(limit as u64 + 1);
            let read = tokio::select! {
                biased;
                _ = self.shutdown.draining() => return Ok(()),
                read = timeout(self.timeouts.idle, bounded.read_line(&mut line)) => read,
            };

            match read {
                Err(_) => {
                    tracing::debug!(idle = ?self.timeouts.idle, "Closing idle RPC connection");
                    return Ok(());
                }
                Ok(Err(e)) => {
                    return Err(Error::network("rpc", format!("failed to read request: {e}")));
                }
                Ok(Ok(0)) => return Ok(()),
                Ok(Ok(_)) if line.trim_end_matches(['\r', '\n']).len() > limit => {
                    tracing::warn!(limit, "Closing RPC connection after oversized request");
                    self.write_response(&mut write_half, &oversized_request_response(limit))
                        .await?;
                    return Ok(());
                }
                Ok(Ok(_)) => {}
            }

            let request = line.trim();
            if request.is_empty() {
                continue;
            }

            let response = tokio::select! {
                biased;
                _ = self.shutdown.aborted() => return Ok(()),
                response = self.service.handle_request(request) => response,
            };
            self.write_response(&mut write_half, &response).await?;
        }
    }

    async fn write_response<S>(
        &self,
        write_half: &mut WriteHalf<S>,
        response: &serde_json::Value,
    ) -> Result<()>
    where
        S: AsyncRead + AsyncWrite,
    {
        let mut payload = response.to_string();
        payload.push('\n');
        let written = timeout(self.timeouts.write, async {
            write_half.write_all(payload.as_bytes()).await?;
            write_half.flush().await
        })
        .await;

        match written {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(Error::network("rpc", format!("failed to write response: {e}"))),
            Err(_) => Err(Error::timeout("write RPC response", self.timeouts.write)),
        }
    }
}
