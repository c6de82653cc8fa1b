//! Discovery information about a running daemon

use serde::{Deserialize, Serialize};

/// What command processes need to know to reach the REST API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatus {
    /// Process ID of the running daemon
    pub pid: u32,
    /// Base URL of the REST API, e.g. `http://127.0.0.1:41234/api`
    pub api_base_url: String,
}
