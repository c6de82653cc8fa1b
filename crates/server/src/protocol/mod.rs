//! JSON-RPC protocol for command processes
//!
//! The daemon exposes its task operations as JSON-RPC 2.0 methods on a local
//! socket. Requests and responses are single-line JSON objects.
//!
//! - `status` reports the PID and the REST API base URL
//! - `tasks/create`, `tasks/list`, `tasks/update` and `tasks/delete` map onto
//!   the task repository
//!
//! Repository errors are classified by `ErrorKind` and sent as JSON-RPC error
//! codes; the client maps the codes back so callers can match on the kind.

// Core protocol types
mod types;
pub use types::*;

// Client for command processes
mod client;
pub use client::TaskClient;

// Request handlers
mod provider_handlers;
pub use provider_handlers::RpcService;

// Accept loop exposing the service
mod provider;
pub use provider::{RpcProvider, RpcTimeouts};

// Tests
#[cfg(test)]
mod tests;
