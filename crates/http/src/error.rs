//! Error handling for the bookclub HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error body returned by every failing endpoint: a human message plus the underlying error text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub message: String,
    pub error: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<serde_json::Value>,
}

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{message}: {error}")]
    NotFound { message: String, error: String },

    #[error("{message}: {error}")]
    Validation {
        message: String,
        error: String,
        details: Vec<serde_json::Value>,
    },

    #[error("{message}: {error}")]
    OperationFailed { message: String, error: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a not found error
    pub fn not_found(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            error: error.into(),
        }
    }

    /// Create a validation error
    pub fn validation(
        message: impl Into<String>,
        error: impl Into<String>,
        details: Vec<serde_json::Value>,
    ) -> Self {
        Self::Validation {
            message: message.into(),
            error: error.into(),
            details,
        }
    }

    /// Create an error for a failed store operation, keeping the driver message verbatim
    pub fn operation_failed(message: impl Into<String>, error: impl ToString) -> Self {
        Self::OperationFailed {
            message: message.into(),
            error: error.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            // Validation shares the catch-all status of the create/update contract.
            AppError::Validation { .. }
            | AppError::OperationFailed { .. }
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let status = self.status();

        let body = match self {
            AppError::NotFound { message, error } | AppError::OperationFailed { message, error } => {
                ErrorBody {
                    message,
                    error,
                    details: Vec::new(),
                }
            }
            AppError::Validation {
                message,
                error,
                details,
            } => ErrorBody {
                message,
                error,
                details,
            },
            AppError::Internal(e) => ErrorBody {
                message: "Internal server error".to_string(),
                error: e.to_string(),
                details: Vec::new(),
            },
        };

        if status.is_server_error() {
            tracing::error!(
                error_id = %error_id,
                status_code = %status.as_u16(),
                message = %body.message,
                error = %body.error,
                "request failed"
            );
        } else {
            tracing::warn!(
                error_id = %error_id,
                status_code = %status.as_u16(),
                message = %body.message,
                "request rejected"
            );
        }

        (status, Json(body)).into_response()
    }
}
