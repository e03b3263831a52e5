// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Portal authentication failed: {0}")]
    Auth(String),

    #[error("Swipe fetch failed: {0}")]
    Fetch(String),

    #[error("Malformed swipe payload: {0}")]
    MalformedPayload(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("{0}")]
    Validation(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// True for failures that originate at the attendance portal.
    ///
    /// These are contained within a single refresh tick and never reach an
    /// API caller.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            AppError::Auth(_) | AppError::Fetch(_) | AppError::MalformedPayload(_)
        )
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::Auth(msg) | AppError::Fetch(msg) | AppError::MalformedPayload(msg) => {
                tracing::warn!(error = %msg, "Upstream error reached a handler");
                (
                    StatusCode::BAD_GATEWAY,
                    "upstream_error".to_string(),
                    Some(msg.clone()),
                )
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error".to_string(),
                    None,
                )
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse { error, details };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
