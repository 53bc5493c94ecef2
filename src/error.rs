// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::{store::StoreError, tools::schema::ValidationError};

/// Transport-level errors for the HTTP surface.
/// Tool failures never use this type: they travel inside the tool envelope.
#[derive(Debug)]
pub enum AppError {
    // 503 Service Unavailable (data store unreachable)
    Unavailable(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Unavailable(msg) => {
                tracing::warn!("Data store unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Data store unavailable".to_string(),
                )
            }
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Unavailable(err.to_string())
    }
}

/// Failures raised while an operation handler runs.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Unsupported(String),

    /// Phase 1 of a fan-out committed but some phase 2 writes did not.
    #[error(
        "{entity} {id} was created but {} of {attempted} progress records failed (students: {})",
        failed.len(),
        failed.join(", ")
    )]
    PartialWrite {
        entity: &'static str,
        id: String,
        attempted: usize,
        failed: Vec<String>,
    },

    #[error("could not encode {0}: {1}")]
    Encode(&'static str, serde_json::Error),

    #[error("handler task failed: {0}")]
    Crashed(String),
}

/// The three per-request failure kinds reported to the calling agent.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownOperation(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Handler(#[from] HandlerError),
}

impl ToolError {
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::UnknownOperation(_) => "unknown_operation",
            ToolError::InvalidArguments(_) => "invalid_arguments",
            ToolError::Handler(_) => "handler_error",
        }
    }
}

impl From<ValidationError> for ToolError {
    fn from(err: ValidationError) -> Self {
        ToolError::InvalidArguments(err.to_string())
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        ToolError::InvalidArguments(err.to_string())
    }
}

impl From<StoreError> for ToolError {
    fn from(err: StoreError) -> Self {
        ToolError::Handler(HandlerError::Store(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_write_names_failed_students() {
        let err = HandlerError::PartialWrite {
            entity: "assignment",
            id: "a-1".to_string(),
            attempted: 3,
            failed: vec!["s-2".to_string(), "s-3".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "assignment a-1 was created but 2 of 3 progress records failed (students: s-2, s-3)"
        );
    }

    #[test]
    fn unreachable_store_maps_to_503() {
        let response = AppError::from(StoreError::Malformed("classes".into())).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn kinds_are_stable() {
        assert_eq!(ToolError::UnknownOperation("x".into()).kind(), "unknown_operation");
        assert_eq!(ToolError::InvalidArguments("x".into()).kind(), "invalid_arguments");
        assert_eq!(
            ToolError::from(HandlerError::NotFound("Assignment".into())).kind(),
            "handler_error"
        );
    }
}
