//! The dual-protocol server: one RPC and one HTTP listener over one store
//!
//! Lifecycle is `Created -> Listening -> Draining -> Stopped`. `serve` binds
//! both listeners, runs both accept loops and returns once both have exited;
//! the end of either loop stops the other one.

use crate::address::{RpcAddress, RpcListener};
use crate::config::ServerConfig;
use crate::http;
use crate::protocol::{RpcProvider, RpcService};
use crate::shutdown::ShutdownSignal;
use crate::status::{api_base_url, LiveStatus, StatusProvider};
use crate::store::{InMemoryTaskStore, TaskRepository};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use todo_daemon_core::{Error, Result, ResultExt};
use todo_daemon_utils::tracing::daemon_span;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinError;
use tracing::{Instrument, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Constructed, nothing bound yet
    Created,
    /// Both listeners are accepting
    Listening,
    /// No new work is accepted, in-flight work is finishing
    Draining,
    /// Both accept loops have exited
    Stopped,
}

/// The addresses `serve` actually bound
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundAddresses {
    pub rpc: RpcAddress,
    pub http: SocketAddr,
}

impl BoundAddresses {
    pub fn api_base_url(&self) -> String {
        api_base_url(self.http)
    }
}

pub struct DualProtocolServer {
    config: ServerConfig,
    repository: Option<Arc<dyn TaskRepository>>,
    span: Span,
    started: AtomicBool,
    handle: ServerHandle,
}

impl DualProtocolServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            repository: None,
            span: daemon_span(std::process::id()),
            started: AtomicBool::new(false),
            handle: ServerHandle {
                state: Arc::new(watch::Sender::new(ServerState::Created)),
                addresses: Arc::new(Mutex::new(None)),
                shutdown: ShutdownSignal::new(),
            },
        }
    }

    /// Serve this repository instead of a fresh in-memory store
    #[must_use]
    pub fn with_repository(mut self, repository: Arc<dyn TaskRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Log under `span` instead of the default daemon span
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// A handle for observing and stopping this server from elsewhere
    pub fn handle(&self) -> ServerHandle {
        self.handle.clone()
    }

    /// Bind both listeners and serve until both accept loops have exited.
    ///
    /// A bind failure aborts startup without leaving the other listener
    /// bound. Errors of both loops are combined into one.
    pub async fn serve(&self, rpc_address: &RpcAddress) -> Result<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(Error::internal("server has already been started"));
        }
        let _stopped = StopOnExit(self.handle.clone());
        self.run(rpc_address).instrument(self.span.clone()).await
    }

    async fn run(&self, rpc_address: &RpcAddress) -> Result<()> {
        let (rpc_listener, http_listener, addresses) = self.bind(rpc_address).await?;

        let tasks: Arc<dyn TaskRepository> = match &self.repository {
            Some(repository) => Arc::clone(repository),
            None if self.config.seed_demo_tasks => Arc::new(InMemoryTaskStore::with_demo_tasks()),
            None => Arc::new(InMemoryTaskStore::new()),
        };
        let status: Arc<dyn StatusProvider> = Arc::new(LiveStatus::new(addresses.http));

        let listening = self.handle.state.send_if_modified(|state| {
            if *state != ServerState::Created {
                return false;
            }
            *self.handle.addresses.lock() = Some(addresses.clone());
            *state = ServerState::Listening;
            true
        });
        if !listening {
            tracing::info!("Stop requested during startup");
            return Ok(());
        }
        tracing::info!(
            rpc = %addresses.rpc,
            api_base_url = %addresses.api_base_url(),
            "Server listening"
        );

        let rpc = RpcProvider::new(
            rpc_listener,
            Arc::new(RpcService::new(Arc::clone(&tasks), status)),
            self.config.rpc.timeouts(),
        );
        let app = http::router(tasks, self.config.http.request_timeout());

        let rpc_loop = {
            let handle = self.handle.clone();
            tokio::spawn(
                async move {
                    let result = rpc.serve(handle.shutdown.clone()).await;
                    handle.begin_draining();
                    result
                }
                .in_current_span(),
            )
        };
        let http_loop = {
            let handle = self.handle.clone();
            tokio::spawn(
                async move {
                    let result = http::serve(http_listener, app, handle.shutdown.clone()).await;
                    handle.begin_draining();
                    result
                }
                .in_current_span(),
            )
        };

        let (rpc_result, http_result) = tokio::join!(rpc_loop, http_loop);
        let errors: Vec<Error> = [
            flatten_join(rpc_result, "RPC"),
            flatten_join(http_result, "HTTP"),
        ]
        .into_iter()
        .filter_map(std::result::Result::err)
        .collect();

        tracing::info!("Server stopped");
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::multiple(errors))
        }
    }

    async fn bind(
        &self,
        rpc_address: &RpcAddress,
    ) -> Result<(RpcListener, TcpListener, BoundAddresses)> {
        let rpc_listener = RpcListener::bind(rpc_address)
            .await
            .context("cannot start RPC server")?;

        // Dropping `rpc_listener` on the error paths below unbinds it again
        let host = self.config.http.host;
        let http_listener = TcpListener::bind((host, 0))
            .await
            .map_err(|e| Error::network(format!("{host}:0"), format!("cannot listen: {e}")))
            .context("cannot start HTTP server")?;
        let http_addr = http_listener
            .local_addr()
            .map_err(|e| Error::network(host.to_string(), format!("cannot read local address: {e}")))?;

        let addresses = BoundAddresses {
            rpc: rpc_listener.local_address()?,
            http: http_addr,
        };
        Ok((rpc_listener, http_listener, addresses))
    }
}

fn flatten_join(result: std::result::Result<Result<()>, JoinError>, protocol: &str) -> Result<()> {
    match result {
        Ok(result) => result,
        Err(e) => Err(Error::internal(format!("{protocol} accept loop panicked: {e}"))),
    }
}

/// Observes and stops a `DualProtocolServer`
#[derive(Clone)]
pub struct ServerHandle {
    state: Arc<watch::Sender<ServerState>>,
    addresses: Arc<Mutex<Option<BoundAddresses>>>,
    shutdown: ShutdownSignal,
}

impl ServerHandle {
    pub fn state(&self) -> ServerState {
        *self.state.borrow()
    }

    /// Wait until both listeners are bound.
    ///
    /// Fails if the server stopped without ever listening, e.g. because a
    /// listener could not be bound.
    pub async fn wait_listening(&self) -> Result<BoundAddresses> {
        let mut rx = self.state.subscribe();
        let _ = rx.wait_for(|state| *state != ServerState::Created).await;

        self.addresses
            .lock()
            .clone()
            .ok_or_else(|| Error::internal("server stopped before listening"))
    }

    /// Stop accepting new work and wait for in-flight requests to finish
    pub async fn graceful_stop(&self) {
        self.begin_stop();
        self.shutdown.drain();
        self.wait_stopped().await;
    }

    /// Stop without waiting for in-flight requests
    pub async fn stop(&self) {
        self.begin_stop();
        self.shutdown.abort();
        self.wait_stopped().await;
    }

    pub async fn wait_stopped(&self) {
        let mut rx = self.state.subscribe();
        let _ = rx.wait_for(|state| *state == ServerState::Stopped).await;
    }

    fn begin_stop(&self) {
        self.state.send_if_modified(|state| match state {
            // Never started: nothing to drain
            ServerState::Created => {
                *state = ServerState::Stopped;
                true
            }
            ServerState::Listening => {
                *state = ServerState::Draining;
                true
            }
            ServerState::Draining | ServerState::Stopped => false,
        });
    }

    fn begin_draining(&self) {
        self.state.send_if_modified(|state| {
            if *state == ServerState::Listening {
                *state = ServerState::Draining;
                true
            } else {
                false
            }
        });
        self.shutdown.drain();
    }
}

struct StopOnExit(ServerHandle);

impl Drop for StopOnExit {
    fn drop(&mut self) {
        // Also reached when `serve` is cancelled; stray loops must not outlive it
        self.0.shutdown.abort();
        self.0.state.send_replace(ServerState::Stopped);
    }
}
