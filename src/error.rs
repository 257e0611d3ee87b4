// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::db::BackendError;
use crate::services::kv::StoreError;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Not allowed for this account")]
    Forbidden,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("Out of range: {distance_meters:.0} m from the fence center (radius {radius_meters:.0} m)")]
    OutOfRange {
        distance_meters: f64,
        radius_meters: f64,
    },

    #[error("Attendance already marked for {0}")]
    AlreadyMarkedToday(String),

    #[error("Complete all tasks to save progress")]
    IncompleteTasks,

    #[error("Backend unreachable: {0}")]
    BackendUnreachable(String),

    #[error("Backend refused the operation: {0}")]
    BackendPermissionDenied(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email already in use")]
    EmailInUse,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    /// Stable machine-readable code for the client.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "unauthorized",
            AppError::Forbidden => "forbidden",
            AppError::BadRequest(_) => "bad_request",
            AppError::NotFound(_) => "not_found",
            AppError::PermissionDenied => "permission_denied",
            AppError::LocationUnavailable(_) => "location_unavailable",
            AppError::OutOfRange { .. } => "out_of_range",
            AppError::AlreadyMarkedToday(_) => "already_marked_today",
            AppError::IncompleteTasks => "incomplete_tasks",
            AppError::BackendUnreachable(_) => "backend_unreachable",
            AppError::BackendPermissionDenied(_) => "backend_permission_denied",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::EmailInUse => "email_in_use",
            AppError::Storage(_) => "storage_error",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotFound(what) => AppError::NotFound(what),
            BackendError::PermissionDenied(msg) => AppError::BackendPermissionDenied(msg),
            BackendError::InvalidCredentials => AppError::InvalidCredentials,
            BackendError::EmailInUse => AppError::EmailInUse,
            BackendError::Unreachable(msg) => AppError::BackendUnreachable(msg),
            BackendError::Rejected(msg) => AppError::BadRequest(msg),
            BackendError::Malformed(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, details) = match &self {
            AppError::Unauthorized | AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, None)
            }
            AppError::Forbidden => (StatusCode::FORBIDDEN, None),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, Some(msg.clone())),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, Some(msg.clone())),
            AppError::PermissionDenied => (StatusCode::FORBIDDEN, Some(self.to_string())),
            AppError::LocationUnavailable(_) | AppError::OutOfRange { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, Some(self.to_string()))
            }
            AppError::AlreadyMarkedToday(_) | AppError::EmailInUse => {
                (StatusCode::CONFLICT, Some(self.to_string()))
            }
            AppError::IncompleteTasks => (StatusCode::UNPROCESSABLE_ENTITY, Some(self.to_string())),
            AppError::BackendUnreachable(msg) => {
                tracing::warn!(error = %msg, "Backend unreachable");
                (StatusCode::BAD_GATEWAY, None)
            }
            AppError::BackendPermissionDenied(msg) => {
                tracing::warn!(error = %msg, "Backend permission denied");
                (StatusCode::BAD_GATEWAY, None)
            }
            AppError::Storage(msg) => {
                tracing::error!(error = %msg, "Storage error");
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
        };

        let body = ErrorResponse {
            error: self.code().to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
