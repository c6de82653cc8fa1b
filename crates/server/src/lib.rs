//! The to-do daemon server
//!
//! A single in-memory task store served over two protocols at once:
//!
//! - **`protocol`**: JSON-RPC on a local socket, used by command processes
//! - **`http`**: a REST API on an ephemeral loopback port
//!
//! `server::DualProtocolServer` owns both listeners and their shared store,
//! `status` tells RPC callers where the REST API lives, and `launcher::run`
//! wraps it all in the process lock for a complete daemon.

pub mod address;
pub mod config;
pub mod http;
pub mod launcher;
pub mod protocol;
pub mod server;
pub mod shutdown;
pub mod status;
pub mod store;

pub use address::RpcAddress;
pub use config::{DaemonConfig, HttpConfig, RpcConfig, ServerConfig};
pub use protocol::TaskClient;
pub use server::{BoundAddresses, DualProtocolServer, ServerHandle, ServerState};
pub use store::{InMemoryTaskStore, TaskRepository};
