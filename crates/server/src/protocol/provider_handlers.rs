//! JSON-RPC request dispatch onto the task repository

use super::types::{
    CreateTaskParams, DeleteTaskParams, DeleteTaskResult, IncomingRequest, ListTasksParams,
    ListTasksResult, StatusParams, UpdateTaskParams, INVALID_REQUEST, METHOD_CREATE_TASK,
    METHOD_DELETE_TASK, METHOD_LIST_TASKS, METHOD_NOT_FOUND, METHOD_STATUS, METHOD_UPDATE_TASK,
    PARSE_ERROR,
};
use crate::status::{self, StatusProvider};
use crate::store::TaskRepository;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use todo_daemon_core::{Error, ErrorKind, ResultExt, TaskCreate, JSONRPC_VERSION};

/// A JSON-RPC error ready to be put on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RpcFailure {
    pub code: i32,
    pub message: String,
}

impl RpcFailure {
    fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<Error> for RpcFailure {
    fn from(error: Error) -> Self {
        let kind = error.kind();
        match kind {
            ErrorKind::InvalidArgument | ErrorKind::NotFound => {
                tracing::warn!(error = %error, "RPC call rejected");
            }
            _ => tracing::error!(error = %error, "RPC call failed"),
        }
        Self::new(kind.rpc_code(), error.to_string())
    }
}

/// Serves the task RPC methods against one repository and status source
pub struct RpcService {
    tasks: Arc<dyn TaskRepository>,
    status: Arc<dyn StatusProvider>,
}

impl RpcService {
    pub fn new(tasks: Arc<dyn TaskRepository>, status: Arc<dyn StatusProvider>) -> Self {
        Self { tasks, status }
    }

    /// Handle one request line and build the response object.
    ///
    /// Every line gets exactly one response, including lines that are not
    /// valid JSON.
    pub async fn handle_request(&self, line: &str) -> Value {
        let raw: Value = match serde_json::from_str(line) {
            Ok(raw) => raw,
            Err(e) => {
                return error_response(
                    Value::Null,
                    RpcFailure::new(PARSE_ERROR, format!("Parse error: {e}")),
                )
            }
        };

        let id = raw.get("id").cloned().unwrap_or(Value::Null);
        let request: IncomingRequest = match serde_json::from_value(raw) {
            Ok(request) => request,
            Err(e) => {
                return error_response(
                    id,
                    RpcFailure::new(INVALID_REQUEST, format!("Invalid request: {e}")),
                )
            }
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return error_response(
                id,
                RpcFailure::new(
                    INVALID_REQUEST,
                    format!("Unsupported JSON-RPC version '{}'", request.jsonrpc),
                ),
            );
        }

        tracing::debug!(method = %request.method, "RPC call");
        match self.dispatch(&request.method, request.params).await {
            Ok(result) => serde_json::json!({
                "jsonrpc": JSONRPC_VERSION,
                "result": result,
                "id": request.id
            }),
            Err(failure) => error_response(request.id, failure),
        }
    }

    async fn dispatch(&self, method: &str, params: Value) -> Result<Value, RpcFailure> {
        match method {
            METHOD_STATUS => {
                let _: StatusParams = parse_params(params)?;
                let status =
                    status::report(self.status.as_ref()).context("cannot get server status")?;
                to_result(&status)
            }
            METHOD_CREATE_TASK => {
                let params: CreateTaskParams = parse_params(params)?;
                let task = self
                    .tasks
                    .create(TaskCreate::new(params.summary))
                    .await
                    .context("cannot create task")?;
                tracing::info!(id = %task.id, "created task");
                to_result(&task)
            }
            METHOD_LIST_TASKS => {
                let _: ListTasksParams = parse_params(params)?;
                let tasks = self.tasks.list().await;
                to_result(&ListTasksResult { tasks })
            }
            METHOD_UPDATE_TASK => {
                let params: UpdateTaskParams = parse_params(params)?;
                let task = self
                    .tasks
                    .update(&params.id, &params.update, &params.fields)
                    .await
                    .with_context(|| format!("cannot update task '{}'", params.id))?;
                tracing::info!(id = %task.id, fields = ?params.fields, "updated task");
                to_result(&task)
            }
            METHOD_DELETE_TASK => {
                let params: DeleteTaskParams = parse_params(params)?;
                self.tasks
                    .delete(&params.id)
                    .await
                    .with_context(|| format!("cannot delete task '{}'", params.id))?;
                tracing::info!(id = %params.id, "deleted task");
                to_result(&DeleteTaskResult {})
            }
            _ => Err(RpcFailure::new(
                METHOD_NOT_FOUND,
                format!("Method not found: {method}"),
            )),
        }
    }
}

fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, RpcFailure> {
    // Omitted params behave like an empty object
    let params = match params {
        Value::Null => Value::Object(serde_json::Map::new()),
        other => other,
    };
    serde_json::from_value(params).map_err(|e| {
        RpcFailure::new(
            ErrorKind::InvalidArgument.rpc_code(),
            format!("Invalid params: {e}"),
        )
    })
}

fn to_result<T: Serialize>(value: &T) -> Result<Value, RpcFailure> {
    serde_json::to_value(value).map_err(|e| {
        RpcFailure::new(
            ErrorKind::Internal.rpc_code(),
            format!("Failed to serialize result: {e}"),
        )
    })
}

/// Response to a request line that exceeded `limit` bytes
pub(crate) fn oversized_request_response(limit: usize) -> Value {
    error_response(
        Value::Null,
        RpcFailure::new(
            INVALID_REQUEST,
            format!("Invalid request: line exceeds {limit} bytes"),
        ),
    )
}

fn error_response(id: Value, failure: RpcFailure) -> Value {
    serde_json::json!({
        "jsonrpc": JSONRPC_VERSION,
        "error": {
            "code": failure.code,
            "message": failure.message
        },
        "id": id
    })
}
