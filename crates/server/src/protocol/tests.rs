//! Tests for the protocol module

#[cfg(test)]
mod protocol_tests {
    use super::super::*;
    use crate::address::{RpcAddress, RpcListener, RpcStream};
    use crate::shutdown::ShutdownSignal;
    use crate::status::{ProcessSnapshot, StatusProvider};
    use crate::store::{InMemoryTaskStore, TaskRepository};
    use serde_json::{json, Value};
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
    use todo_daemon_core::{ErrorKind, FieldMask, Task, TaskPatch};

    fn snapshot(pid: i64) -> Arc<dyn StatusProvider> {
        Arc::new(move || ProcessSnapshot {
            pid,
            http_addr: SocketAddr::from(([127, 0, 0, 1], 45678)),
        })
    }

    fn service_with_pid(pid: i64) -> RpcService {
        let store: Arc<dyn TaskRepository> = Arc::new(InMemoryTaskStore::new());
        RpcService::new(store, snapshot(pid))
    }

    async fn call(service: &RpcService, request: Value) -> Value {
        service.handle_request(&request.to_string()).await
    }

    #[test]
    fn test_protocol_types_serialization() {
        let response_json = r#"{"jsonrpc":"2.0","result":{"tasks":[]},"id":1}"#;
        let response: JsonRpcResponse<ListTasksResult> =
            serde_json::from_str(response_json).unwrap();
        assert_eq!(response.jsonrpc, "2.0");
        assert_eq!(response.id, json!(1));
        assert!(response.error.is_none());
        assert!(response.result.unwrap().tasks.is_empty());

        let error_json = r#"{"jsonrpc":"2.0","error":{"code":-32601,"message":"Method not found"},"id":1}"#;
        let error_response: JsonRpcResponse<Value> = serde_json::from_str(error_json).unwrap();
        let error = error_response.error.unwrap();
        assert_eq!(error.code, METHOD_NOT_FOUND);
        assert_eq!(error.message, "Method not found");
        assert!(error.data.is_none());
    }

    #[test]
    fn test_error_response_without_result_parses_for_any_result_type() {
        let error_json = r#"{"jsonrpc":"2.0","error":{"code":-32004,"message":"not found"},"id":9}"#;
        let response: JsonRpcResponse<Task> = serde_json::from_str(error_json).unwrap();
        assert!(response.result.is_none());
        assert_eq!(response.error.unwrap().code, ErrorKind::NotFound.rpc_code());

        let task_json = r#"{"jsonrpc":"2.0","result":{"id":"1","summary":"buy milk","created_at":"2024-01-01T00:00:00Z"},"id":10}"#;
        let response: JsonRpcResponse<Task> = serde_json::from_str(task_json).unwrap();
        assert_eq!(response.result.unwrap().summary, "buy milk");
    }

    #[test]
    fn test_update_params_ignore_unknown_fields() {
        let params: UpdateTaskParams = serde_json::from_value(json!({
            "id": "3",
            "update": {"summary": "X"},
            "fields": ["summary", "deleted_at"]
        }))
        .unwrap();
        assert_eq!(params.id, "3");
        assert_eq!(params.fields, FieldMask::from_names(["summary"]));
    }

    #[tokio::test]
    async fn test_status_reports_pid_and_base_url() {
        let service = service_with_pid(4242);
        let response = call(
            &service,
            json!({"jsonrpc": "2.0", "method": "status", "id": 1}),
        )
        .await;

        assert_eq!(response["id"], 1);
        assert_eq!(response["result"]["pid"], 4242);
        assert_eq!(
            response["result"]["api_base_url"],
            "http://127.0.0.1:45678/api"
        );
    }

    #[tokio::test]
    async fn test_status_with_invalid_pid_is_internal_error() {
        let service = service_with_pid(-7);
        let response = call(
            &service,
            json!({"jsonrpc": "2.0", "method": "status", "params": {}, "id": "a"}),
        )
        .await;

        assert_eq!(response["id"], "a");
        assert_eq!(response["error"]["code"], ErrorKind::Internal.rpc_code());
        assert!(response.get("result").is_none());
    }

    #[tokio::test]
    async fn test_malformed_lines_get_protocol_errors() {
        let service = service_with_pid(1);

        let response = service.handle_request("{not json").await;
        assert_eq!(response["error"]["code"], PARSE_ERROR);
        assert_eq!(response["id"], Value::Null);

        let response = call(&service, json!({"jsonrpc": "2.0", "id": 5})).await;
        assert_eq!(response["error"]["code"], INVALID_REQUEST);
        assert_eq!(response["id"], 5);

        let response = call(
            &service,
            json!({"jsonrpc": "1.0", "method": "tasks/list", "id": 6}),
        )
        .await;
        assert_eq!(response["error"]["code"], INVALID_REQUEST);

        let response = call(
            &service,
            json!({"jsonrpc": "2.0", "method": "tasks/purge", "id": 7}),
        )
        .await;
        assert_eq!(response["error"]["code"], METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_params_and_missing_tasks_map_to_codes() {
        let service = service_with_pid(1);

        let response = call(
            &service,
            json!({"jsonrpc": "2.0", "method": "tasks/create", "params": {}, "id": 1}),
        )
        .await;
        assert_eq!(
            response["error"]["code"],
            ErrorKind::InvalidArgument.rpc_code()
        );

        let response = call(
            &service,
            json!({"jsonrpc": "2.0", "method": "tasks/create", "params": {"summary": " "}, "id": 2}),
        )
        .await;
        assert_eq!(
            response["error"]["code"],
            ErrorKind::InvalidArgument.rpc_code()
        );

        let response = call(
            &service,
            json!({"jsonrpc": "2.0", "method": "tasks/delete", "params": {"id": "99"}, "id": 3}),
        )
        .await;
        assert_eq!(response["error"]["code"], ErrorKind::NotFound.rpc_code());
        let message = response["error"]["message"].as_str().unwrap();
        assert!(message.starts_with("cannot delete task '99'"));
    }

    #[tokio::test]
    async fn test_task_methods_round_trip_through_service() {
        let service = service_with_pid(1);

        let created = call(
            &service,
            json!({"jsonrpc": "2.0", "method": "tasks/create", "params": {"summary": "buy milk"}, "id": 1}),
        )
        .await;
        let id = created["result"]["id"].as_str().unwrap().to_string();
        assert!(created["result"].get("completed_at").is_none());

        let updated = call(
            &service,
            json!({
                "jsonrpc": "2.0",
                "method": "tasks/update",
                "params": {"id": id, "update": {"summary": "buy oat milk"}, "fields": ["summary"]},
                "id": 2
            }),
        )
        .await;
        assert_eq!(updated["result"]["summary"], "buy oat milk");
        assert!(updated["result"]["updated_at"].is_string());

        let listed = call(
            &service,
            json!({"jsonrpc": "2.0", "method": "tasks/list", "id": 3}),
        )
        .await;
        assert_eq!(listed["result"]["tasks"].as_array().unwrap().len(), 1);

        let deleted = call(
            &service,
            json!({"jsonrpc": "2.0", "method": "tasks/delete", "params": {"id": id}, "id": 4}),
        )
        .await;
        assert_eq!(deleted["result"], json!({}));
    }

    #[tokio::test]
    async fn test_client_against_provider_over_tcp() {
        let listener = RpcListener::bind(&RpcAddress::parse("tcp", "127.0.0.1:0").unwrap())
            .await
            .unwrap();
        let address = listener.local_address().unwrap();
        let service = Arc::new(service_with_pid(1234));
        let shutdown = ShutdownSignal::new();
        let provider = RpcProvider::new(listener, service, RpcTimeouts::default());
        let serving = tokio::spawn(provider.serve(shutdown.clone()));

        let mut client = TaskClient::connect(&address)
            .await
            .unwrap()
            .with_timeout(Duration::from_secs(5));

        let status = client.status().await.unwrap();
        assert_eq!(status.pid, 1234);

        let task = client.create_task("buy milk").await.unwrap();
        let done = client.complete_task(&task.id).await.unwrap();
        assert!(done.completed_at.is_some());
        assert_eq!(done.summary, "buy milk");

        let err = client
            .update_task("nope", &TaskPatch::summary("x"), &FieldMask::all())
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = client.create_task("").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        client.delete_task(&task.id).await.unwrap();
        assert!(client.list_tasks().await.unwrap().is_empty());

        shutdown.drain();
        serving.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_idle_connection_is_closed() {
        let listener = RpcListener::bind(&RpcAddress::parse("tcp", "127.0.0.1:0").unwrap())
            .await
            .unwrap();
        let address = listener.local_address().unwrap();
        let timeouts = RpcTimeouts {
            idle: Duration::from_millis(50),
            write: Duration::from_secs(1),
        };
        let shutdown = ShutdownSignal::new();
        let provider = RpcProvider::new(listener, Arc::new(service_with_pid(1)), timeouts);
        let serving = tokio::spawn(provider.serve(shutdown.clone()));

        let mut client = TaskClient::connect(&address).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        let err = client.list_tasks().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unavailable);

        shutdown.drain();
        serving.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_oversized_request_line_closes_connection() {
        let listener = RpcListener::bind(&RpcAddress::parse("tcp", "127.0.0.1:0").unwrap())
            .await
            .unwrap();
        let address = listener.local_address().unwrap();
        let shutdown = ShutdownSignal::new();
        let provider = RpcProvider::new(listener, Arc::new(service_with_pid(1)), RpcTimeouts::default())
            .with_max_request_bytes(64);
        let serving = tokio::spawn(provider.serve(shutdown.clone()));

        // Short requests are still served
        let mut client = TaskClient::connect(&address)
            .await
            .unwrap()
            .with_timeout(Duration::from_secs(5));
        assert!(client.list_tasks().await.unwrap().is_empty());

        let mut stream = RpcStream::connect(&address).await.unwrap();
        stream.write_all(&[b'a'; 256]).await.unwrap();
        stream.flush().await.unwrap();

        let mut reader = BufReader::new(stream);
        let mut line = String::new();
        tokio::time::timeout(Duration::from_secs(5), reader.read_line(&mut line))
            .await
            .unwrap()
            .unwrap();
        let response: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(response["error"]["code"], INVALID_REQUEST);
        assert_eq!(response["id"], Value::Null);

        let mut rest = Vec::new();
        let read = tokio::time::timeout(Duration::from_secs(5), reader.read_to_end(&mut rest))
            .await
            .unwrap();
        assert!(read.is_err() || rest.is_empty());

        shutdown.drain();
        serving.await.unwrap().unwrap();
    }
}
