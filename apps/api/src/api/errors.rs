use std::io;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::agents::AgentError;
use crate::domain::repositories::StoreError;
use crate::workflow::WorkflowError;

/// API error type with HTTP status code and message
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    /// Creates a new API error
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Creates a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Creates a 404 Not Found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Creates a 409 Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// Creates a 500 Internal Server Error
    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, message = %self.message, "Request failed");
        }

        let body = Json(json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => Self::not_found(format!("Not found: {}", what)),
            StoreError::Io(e) if e.kind() == io::ErrorKind::InvalidInput => {
                Self::bad_request(e.to_string())
            }
            other => Self::internal_server_error(other.to_string()),
        }
    }
}

impl From<AgentError> for ApiError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::NotFound(_) | AgentError::UnknownWorker(_) => {
                Self::not_found(err.to_string())
            }
            AgentError::InvalidInput(_) => Self::bad_request(err.to_string()),
            AgentError::TransportError(_) => Self::new(StatusCode::BAD_GATEWAY, err.to_string()),
            AgentError::PersistenceError(_) => Self::internal_server_error(err.to_string()),
        }
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::NotFound(_) => Self::not_found(err.to_string()),
            WorkflowError::InvalidState(_) => Self::conflict(err.to_string()),
            _ => Self::internal_server_error(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_errors_map_to_status_codes() {
        let err: ApiError = AgentError::InvalidInput("empty".to_string()).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err: ApiError = AgentError::TransportError("refused".to_string()).into();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);

        let err: ApiError = AgentError::NotFound("project acme".to_string()).into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn invalid_path_input_is_a_bad_request() {
        let io = io::Error::new(io::ErrorKind::InvalidInput, "invalid project name '..'");
        let err: ApiError = StoreError::Io(io).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
