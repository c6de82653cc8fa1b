//! Status reporting for command processes that need to find the REST API

use std::net::SocketAddr;
use todo_daemon_core::{Error, Result, ServerStatus, API_BASE_PATH};

/// Raw facts about the running process, before validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessSnapshot {
    /// Process ID as reported by the platform; may be out of range
    pub pid: i64,
    /// Actual address the HTTP listener is bound to
    pub http_addr: SocketAddr,
}

/// Supplies the current process snapshot on demand
pub trait StatusProvider: Send + Sync {
    fn snapshot(&self) -> ProcessSnapshot;
}

impl<F> StatusProvider for F
where
    F: Fn() -> ProcessSnapshot + Send + Sync,
{
    fn snapshot(&self) -> ProcessSnapshot {
        self()
    }
}

/// Provider for the daemon process itself, bound to a fixed HTTP address
#[derive(Debug, Clone, Copy)]
pub struct LiveStatus {
    http_addr: SocketAddr,
}

impl LiveStatus {
    pub fn new(http_addr: SocketAddr) -> Self {
        Self { http_addr }
    }
}

impl StatusProvider for LiveStatus {
    fn snapshot(&self) -> ProcessSnapshot {
        ProcessSnapshot {
            pid: i64::from(std::process::id()),
            http_addr: self.http_addr,
        }
    }
}

/// Build the REST API base URL for a bound HTTP address
pub fn api_base_url(http_addr: SocketAddr) -> String {
    format!("http://{http_addr}{API_BASE_PATH}")
}

/// Produce the status record, rejecting PIDs that do not fit in `u32`
pub fn report(provider: &dyn StatusProvider) -> Result<ServerStatus> {
    let snapshot = provider.snapshot();
    let pid = u32::try_from(snapshot.pid)
        .map_err(|_| Error::internal(format!("invalid server PID {}", snapshot.pid)))?;

    Ok(ServerStatus {
        pid,
        api_base_url: api_base_url(snapshot.http_addr),
    })
}
