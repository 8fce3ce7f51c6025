//! Error handling for the Smart Agriculture services
//!
//! Every failure is scoped to the call that produced it and surfaces to the
//! caller as a status code plus a JSON error body. Streaming calls deliver the
//! same body as their final frame.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unknown location: {0}")]
    UnknownLocation(String),

    #[error("Invalid request: {field}: {message}")]
    InvalidRequest { field: String, message: String },

    #[error("Stream aborted: {0}")]
    StreamAborted(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::InvalidRequest {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::UnknownLocation(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::StreamAborted(_) => StatusCode::BAD_REQUEST,
            AppError::Configuration(_) | AppError::Internal(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::UnknownLocation(_) => "UNKNOWN_LOCATION",
            AppError::InvalidRequest { .. } => "INVALID_REQUEST",
            AppError::StreamAborted(_) => "STREAM_ABORTED",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Internal(_) | AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Error body as sent to the caller
    pub fn to_response_body(&self) -> ErrorResponse {
        let (message, field) = match self {
            AppError::UnknownLocation(location) => {
                (format!("No readings are available for location '{}'", location), None)
            }
            AppError::InvalidRequest { field, message } => (message.clone(), Some(field.clone())),
            AppError::StreamAborted(reason) => {
                (format!("Inbound stream terminated abnormally: {}", reason), None)
            }
            AppError::Configuration(msg) => (format!("Configuration error: {}", msg), None),
            AppError::Internal(msg) => (msg.clone(), None),
            AppError::InternalError(_) => ("An internal server error occurred".to_string(), None),
        };

        ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                message,
                field,
            },
        }
    }

    /// Log at a level matching who is at fault
    pub fn log(&self) {
        if self.status().is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!(code = self.code(), "Request failed: {}", self);
        }
    }
}

/// Error response structure
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        (self.status(), Json(self.to_response_body())).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by_key(|(field, _)| *field);

        match fields.first() {
            Some((field, field_errors)) => {
                let message = field_errors
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                AppError::invalid(*field, message)
            }
            None => AppError::invalid("request", "Request failed validation"),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::invalid("body", rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::invalid("query", rejection.body_text())
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
