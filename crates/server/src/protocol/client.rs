//! RPC client used by short-lived command processes

use super::types::{
    CreateTaskParams, DeleteTaskParams, DeleteTaskResult, JsonRpcRequest, JsonRpcResponse,
    ListTasksParams, ListTasksResult, StatusParams, UpdateTaskParams, METHOD_CREATE_TASK,
    METHOD_DELETE_TASK, METHOD_LIST_TASKS, METHOD_STATUS, METHOD_UPDATE_TASK,
};
use crate::address::{RpcAddress, RpcStream};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use todo_daemon_core::{Error, FieldMask, Result, ServerStatus, Task, TaskPatch, JSONRPC_VERSION};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, ReadHalf, WriteHalf};
use tokio::time::timeout;

/// One RPC connection to a running daemon
pub struct TaskClient {
    reader: BufReader<ReadHalf<RpcStream>>,
    writer: WriteHalf<RpcStream>,
    endpoint: String,
    next_id: u64,
    timeout: Duration,
    /// Set once a round trip failed midway; the stream may hold a stale response
    broken: bool,
}

impl TaskClient {
    /// Default bound on a single round trip
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connect to the daemon listening at `address`
    pub async fn connect(address: &RpcAddress) -> Result<Self> {
        let stream = RpcStream::connect(address).await?;
        let (read_half, write_half) = tokio::io::split(stream);

        Ok(Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            endpoint: address.to_string(),
            next_id: 1,
            timeout: Self::DEFAULT_TIMEOUT,
            broken: false,
        })
    }

    /// Use a different bound for each round trip
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the daemon's PID and REST API base URL
    pub async fn status(&mut self) -> Result<ServerStatus> {
        self.call(METHOD_STATUS, StatusParams::default()).await
    }

    pub async fn create_task(&mut self, summary: &str) -> Result<Task> {
        self.call(
            METHOD_CREATE_TASK,
            CreateTaskParams {
                summary: summary.to_string(),
            },
        )
        .await
    }

    pub async fn list_tasks(&mut self) -> Result<Vec<Task>> {
        let result: ListTasksResult = self
            .call(METHOD_LIST_TASKS, ListTasksParams::default())
            .await?;
        Ok(result.tasks)
    }

    /// Change the fields of a task named in `fields`
    pub async fn update_task(
        &mut self,
        id: &str,
        update: &TaskPatch,
        fields: &FieldMask,
    ) -> Result<Task> {
        self.call(
            METHOD_UPDATE_TASK,
            UpdateTaskParams {
                id: id.to_string(),
                update: update.clone(),
                fields: fields.clone(),
            },
        )
        .await
    }

    /// Mark a task as completed now, leaving its summary alone
    pub async fn complete_task(&mut self, id: &str) -> Result<Task> {
        self.update_task(
            id,
            &TaskPatch::completed_at(Utc::now()),
            &FieldMask::from_names(["completed_at"]),
        )
        .await
    }

    pub async fn delete_task(&mut self, id: &str) -> Result<()> {
        let _: DeleteTaskResult = self
            .call(METHOD_DELETE_TASK, DeleteTaskParams { id: id.to_string() })
            .await?;
        Ok(())
    }

    async fn call<P: Serialize, R: DeserializeOwned>(
        &mut self,
        method: &str,
        params: P,
    ) -> Result<R> {
        let request = JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.to_string(),
            params,
            id: self.next_id(),
        };

        if self.broken {
            return Err(Error::network(
                self.endpoint.clone(),
                "connection is unusable after an earlier failed call, reconnect first",
            ));
        }

        let limit = self.timeout;
        let response: JsonRpcResponse<R> = match timeout(limit, self.send_request(&request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                self.broken = true;
                return Err(e);
            }
            Err(_) => {
                self.broken = true;
                return Err(Error::timeout(format!("RPC call '{method}'"), limit));
            }
        };

        if let Some(error) = response.error {
            return Err(Error::rpc(error.code, error.message));
        }

        response.result.ok_or_else(|| {
            Error::network(
                self.endpoint.clone(),
                format!("response to '{method}' carries no result"),
            )
        })
    }

    /// Send JSON-RPC request and wait for response
    async fn send_request<T: Serialize, R: DeserializeOwned>(
        &mut self,
        request: &JsonRpcRequest<T>,
    ) -> Result<JsonRpcResponse<R>> {
        let mut request_json = serde_json::to_string(request)?;
        request_json.push('\n');

        self.writer
            .write_all(request_json.as_bytes())
            .await
            .map_err(|e| Error::network(self.endpoint.clone(), format!("failed to send request: {e}")))?;
        self.writer
            .flush()
            .await
            .map_err(|e| Error::network(self.endpoint.clone(), format!("failed to send request: {e}")))?;

        let mut response_line = String::new();
        let read = self
            .reader
            .read_line(&mut response_line)
            .await
            .map_err(|e| Error::network(self.endpoint.clone(), format!("failed to read response: {e}")))?;
        if read == 0 {
            return Err(Error::network(
                self.endpoint.clone(),
                "connection closed by server",
            ));
        }

        let response: JsonRpcResponse<R> = serde_json::from_str(&response_line).map_err(|e| {
            Error::network(
                self.endpoint.clone(),
                format!("failed to parse response: {e}"),
            )
        })?;

        if response.jsonrpc != JSONRPC_VERSION {
            return Err(Error::network(
                self.endpoint.clone(),
                format!(
                    "invalid JSON-RPC version: expected '{JSONRPC_VERSION}', got '{}'",
                    response.jsonrpc
                ),
            ));
        }

        if response.id != serde_json::Value::from(request.id) {
            return Err(Error::network(
                self.endpoint.clone(),
                format!(
                    "response ID mismatch: expected {}, got {}",
                    request.id, response.id
                ),
            ));
        }

        Ok(response)
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}
