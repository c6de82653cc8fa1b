//! JSON-RPC protocol types and structures
//!
//! Messages are JSON-RPC 2.0 objects, one per line, in both directions.

use serde::{Deserialize, Serialize};
use todo_daemon_core::{FieldMask, Task, TaskPatch};

/// Report the daemon's PID and REST API base URL
pub const METHOD_STATUS: &str = "status";
pub const METHOD_CREATE_TASK: &str = "tasks/create";
pub const METHOD_LIST_TASKS: &str = "tasks/list";
pub const METHOD_UPDATE_TASK: &str = "tasks/update";
pub const METHOD_DELETE_TASK: &str = "tasks/delete";

/// Invalid JSON was received
pub const PARSE_ERROR: i32 = -32700;
/// The JSON sent is not a valid request object
pub const INVALID_REQUEST: i32 = -32600;
/// The method does not exist
pub const METHOD_NOT_FOUND: i32 = -32601;

/// JSON-RPC 2.0 request structure, as sent by clients
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<T> {
    pub jsonrpc: String,
    pub method: String,
    pub params: T,
    pub id: u64,
}

/// A request as seen by the server; the ID is echoed back verbatim
#[derive(Debug, Deserialize)]
pub struct IncomingRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    #[serde(default)]
    pub id: serde_json::Value,
}

/// JSON-RPC 2.0 response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcResponse<T> {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: serde_json::Value,
}

/// JSON-RPC error structure
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Parameters of `status` (none)
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StatusParams {}

/// Parameters of `tasks/create`
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTaskParams {
    pub summary: String,
}

/// Parameters of `tasks/list` (none)
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ListTasksParams {}

/// Result of `tasks/list`
#[derive(Debug, Serialize, Deserialize)]
pub struct ListTasksResult {
    pub tasks: Vec<Task>,
}

/// Parameters of `tasks/update`
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateTaskParams {
    pub id: String,
    #[serde(default)]
    pub update: TaskPatch,
    #[serde(default)]
    pub fields: FieldMask,
}

/// Parameters of `tasks/delete`
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteTaskParams {
    pub id: String,
}

/// Result of `tasks/delete` (empty object)
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DeleteTaskResult {}

