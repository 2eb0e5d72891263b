//! HTTP error type and its mapping from store errors to JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::error::NotesError;

/// Which endpoint an error came from; picks the user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Save,
    Open,
    Delete,
    Rename,
    List,
    Upload,
}

impl Operation {
    fn failure_message(self) -> &'static str {
        match self {
            Operation::Save => "Failed to save",
            Operation::Open => "Failed to read note",
            Operation::Delete => "Failed to delete note",
            Operation::Rename => "Failed to rename note",
            Operation::List => "Failed to list notes",
            Operation::Upload => "Failed to store image",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("{0}")]
    MissingName(String),

    #[error("Invalid path")]
    InvalidPath,

    #[error("{0}")]
    NotFound(String),

    #[error("A note with the new name already exists")]
    Conflict,

    #[error("{0}")]
    StorageError(String),

    /// Malformed body, missing upload field or body over the size ceiling.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingName(_) | ApiError::InvalidPath => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict => StatusCode::CONFLICT,
            ApiError::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Rejected { status, .. } => *status,
        }
    }

    /// Get the error type name for the response payload.
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::MissingName(_) => "MissingName",
            ApiError::InvalidPath => "InvalidPath",
            ApiError::NotFound(_) => "NotFound",
            ApiError::Conflict => "Conflict",
            ApiError::StorageError(_) => "StorageError",
            ApiError::Rejected { .. } => "BadRequest",
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::Rejected {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// Map a store error to the response for `op`. Storage failures are
    /// logged with their cause and reported with a generic message.
    pub fn from_store(op: Operation, err: NotesError) -> Self {
        match err {
            NotesError::MissingName if op == Operation::Rename => {
                ApiError::MissingName("Missing oldName or newName".to_string())
            }
            NotesError::MissingName => ApiError::MissingName("No note name".to_string()),
            NotesError::InvalidPath(_) => ApiError::InvalidPath,
            NotesError::NotFound(_) if op == Operation::Rename => {
                ApiError::NotFound("Original note does not exist".to_string())
            }
            NotesError::NotFound(_) => ApiError::NotFound("Note not found".to_string()),
            NotesError::Conflict(_) => ApiError::Conflict,
            other => {
                error!(operation = ?op, error = %other, "storage failure");
                ApiError::StorageError(op.failure_message().to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "success": false,
            "error": self.to_string(),
            "error_type": self.error_type(),
        });
        (self.status(), Json(body)).into_response()
    }
}
