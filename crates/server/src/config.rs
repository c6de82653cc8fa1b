//! Daemon configuration
//!
//! Every field has a default, so an empty JSON object (or no file at all) is
//! a valid configuration. Paths default to the per-user runtime directory.

use crate::protocol::RpcTimeouts;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use todo_daemon_core::{Error, Result, ResultExt};
use todo_daemon_utils::{default_lock_file, default_sock_file};

/// Everything `launcher::run` needs to start a daemon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// File locked for the lifetime of the daemon
    pub lock_file: PathBuf,
    /// Socket the RPC server listens on
    pub sock_file: PathBuf,
    /// Deadline for draining before in-flight work is abandoned; unbounded
    /// when absent
    pub drain_timeout_ms: Option<u64>,
    #[serde(flatten)]
    pub server: ServerConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            lock_file: default_lock_file(),
            sock_file: default_sock_file(),
            drain_timeout_ms: None,
            server: ServerConfig::default(),
        }
    }
}

impl DaemonConfig {
    /// Read the configuration from `path`, or use the defaults when no path
    /// is given. Keys missing from the file keep their defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::file_system(path, "read config", e))?;
        serde_json::from_str(&content)
            .with_context(|| format!("cannot parse config file '{}'", path.display()))
    }

    pub fn drain_timeout(&self) -> Option<Duration> {
        self.drain_timeout_ms.map(Duration::from_millis)
    }
}

/// Settings of the dual-protocol server itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Start with the demo tasks instead of an empty list
    pub seed_demo_tasks: bool,
    pub http: HttpConfig,
    pub rpc: RpcConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Interface the REST API binds to; the port is always chosen by the OS
    pub host: IpAddr,
    pub request_timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            request_timeout_ms: 10_000,
        }
    }
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    pub idle_timeout_ms: u64,
    pub write_timeout_ms: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            idle_timeout_ms: 60_000,
            write_timeout_ms: 10_000,
        }
    }
}

impl RpcConfig {
    pub fn timeouts(&self) -> RpcTimeouts {
        RpcTimeouts {
            idle: Duration::from_millis(self.idle_timeout_ms),
            write: Duration::from_millis(self.write_timeout_ms),
        }
    }
}
