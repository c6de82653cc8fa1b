//! Error responses of the REST API

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use todo_daemon_core::{Error, ErrorKind};

/// Body of every non-2xx response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

/// An HTTP status paired with a message safe to show to the caller
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        match error.kind() {
            ErrorKind::InvalidArgument => {
                tracing::warn!(error = %error, "HTTP request rejected");
                Self::new(StatusCode::BAD_REQUEST, error.to_string())
            }
            ErrorKind::NotFound => {
                tracing::warn!(error = %error, "HTTP request rejected");
                Self::new(StatusCode::NOT_FOUND, error.to_string())
            }
            _ => {
                tracing::error!(error = %error, "HTTP request failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!(error = %rejection, "malformed request body");
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                message: self.message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_daemon_core::ResultExt;

    #[test]
    fn test_kinds_map_to_status_codes() {
        let not_found: Result<(), Error> = Err(Error::task_not_found("3"));
        let err = ApiError::from(not_found.context("cannot delete task '3'").unwrap_err());
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert!(err.message.contains("no such task: 3"));

        let err = ApiError::from(Error::invalid_argument("task summary cannot be empty"));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_details_are_not_exposed() {
        let err = ApiError::from(Error::internal("invalid server PID -1"));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "internal server error");
    }
}
