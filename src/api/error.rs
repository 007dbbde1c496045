//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::assistant::AssistantError;
use crate::domain::PortalError;
use crate::profiles::ProfileError;
use crate::session::{FieldError, SessionError};

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing or unknown bearer token
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but the role may not do this
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Domain rule violated
    #[error(transparent)]
    Portal(#[from] PortalError),

    #[error(transparent)]
    Session(#[from] SessionError),

    /// Hosted profile backend failed
    #[error("Profile backend error: {0}")]
    Profiles(#[from] ProfileError),

    #[error(transparent)]
    Assistant(#[from] AssistantError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    /// Whether repeating the request may succeed
    pub retryable: bool,
    /// Per-field problems for form submissions
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

fn portal_status(err: &PortalError) -> (StatusCode, &'static str) {
    match err {
        PortalError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        PortalError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        PortalError::AlreadyExists { .. } => (StatusCode::CONFLICT, "ALREADY_EXISTS"),
        PortalError::AlreadyEnrolled(_) => (StatusCode::CONFLICT, "ALREADY_ENROLLED"),
        PortalError::NotEnrolled(_) => (StatusCode::CONFLICT, "NOT_ENROLLED"),
        PortalError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
    }
}

impl ApiError {
    /// Status, machine code and retryability
    fn classify(&self) -> (StatusCode, &'static str, bool) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", false),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", false),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN", false),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", false),
            ApiError::Portal(e) | ApiError::Session(SessionError::Portal(e)) => {
                let (status, code) = portal_status(e);
                (status, code, false)
            }
            ApiError::Session(SessionError::InvalidForm(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", false)
            }
            ApiError::Session(SessionError::Storage(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", true)
            }
            ApiError::Profiles(ProfileError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", false)
            }
            ApiError::Profiles(e) => (
                StatusCode::BAD_GATEWAY,
                "PROFILE_BACKEND_ERROR",
                e.is_retryable(),
            ),
            ApiError::Assistant(AssistantError::NotAStudent) => {
                (StatusCode::FORBIDDEN, "FORBIDDEN", false)
            }
            ApiError::Assistant(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", false),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", false),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR", false),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, retryable) = self.classify();

        let request_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "API error occurred"
            );
        } else {
            tracing::debug!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "Request rejected"
            );
        }

        let fields = match self {
            ApiError::Session(SessionError::InvalidForm(ref fields)) => fields.clone(),
            _ => Vec::new(),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
                retryable,
                fields,
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
