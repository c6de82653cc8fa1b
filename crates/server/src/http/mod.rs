//! REST API over HTTP
//!
//! Routes live under `/api/v1`. Bodies are JSON; errors are
//! `{"message": "..."}` with a status derived from the error kind.

mod error;
mod handlers;

pub use error::{ApiError, ErrorBody};
pub use handlers::PatchTaskBody;

use crate::shutdown::ShutdownSignal;
use crate::store::TaskRepository;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch};
use axum::Router;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use todo_daemon_core::{Error, Result, API_BASE_PATH, TASKS_COLLECTION_PATH};
use tokio::net::TcpListener;
use tokio_util::task::TaskTracker;

/// Shared state for axum handlers
#[derive(Clone)]
pub struct AppState {
    pub tasks: Arc<dyn TaskRepository>,
}

/// Build the REST router; every request is bounded by `request_timeout`
pub fn router(tasks: Arc<dyn TaskRepository>, request_timeout: Duration) -> Router {
    let api = Router::new()
        .route(
            TASKS_COLLECTION_PATH,
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route(
            &format!("{TASKS_COLLECTION_PATH}/:id"),
            patch(handlers::update_task).delete(handlers::delete_task),
        )
        .with_state(AppState { tasks });

    Router::new()
        .nest(API_BASE_PATH, api)
        .layer(middleware::from_fn_with_state(
            request_timeout,
            timeout_middleware,
        ))
}

async fn timeout_middleware(
    State(limit): State<Duration>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(method = %method, path = %path, limit = ?limit, "HTTP request timed out");
            ApiError::new(StatusCode::REQUEST_TIMEOUT, "request timed out").into_response()
        }
    }
}

/// Handlers still running, and the signal that cancels them
#[derive(Clone)]
struct InFlight {
    shutdown: ShutdownSignal,
    tracker: TaskTracker,
}

/// Cancel the handler with 503 once an immediate stop is requested
async fn abort_middleware(
    State(in_flight): State<InFlight>,
    request: Request,
    next: Next,
) -> Response {
    let _token = in_flight.tracker.token();
    let path = request.uri().path().to_string();

    tokio::select! {
        biased;
        _ = in_flight.shutdown.aborted() => {
            tracing::debug!(path = %path, "HTTP request abandoned");
            ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "server is shutting down").into_response()
        }
        response = next.run(request) => response,
    }
}

/// Serve `app` until a stop is requested.
///
/// A graceful stop lets in-flight requests finish. An immediate stop cancels
/// every running handler and returns once they have all been dropped, so no
/// handler touches the store after this returns.
pub async fn serve(listener: TcpListener, app: Router, shutdown: ShutdownSignal) -> Result<()> {
    let endpoint = listener
        .local_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "http".to_string());
    tracing::info!(endpoint = %endpoint, "HTTP server listening");

    let in_flight = InFlight {
        shutdown: shutdown.clone(),
        tracker: TaskTracker::new(),
    };
    let app = app.layer(middleware::from_fn_with_state(
        in_flight.clone(),
        abort_middleware,
    ));

    let graceful = shutdown.clone();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move { graceful.draining().await })
        .into_future();

    tokio::select! {
        result = server => {
            tracing::debug!(endpoint = %endpoint, "HTTP requests drained");
            result.map_err(|e| Error::network(endpoint.clone(), format!("HTTP server failed: {e}")))
        }
        _ = shutdown.aborted() => {
            in_flight.tracker.close();
            in_flight.tracker.wait().await;
            tracing::debug!(endpoint = %endpoint, "HTTP requests abandoned");
            Ok(())
        }
    }
}
