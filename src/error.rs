// SPDX-License-Identifier: MIT

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
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unknown fuel type: {0}")]
    UnknownFuelType(String),

    #[error("Unknown flight class: {0}")]
    UnknownFlightClass(String),

    #[error("Emission factors not found for {0}")]
    RegionNotFound(String),

    #[error("Emission factor not found for {state}, {country}")]
    StateNotFound { state: String, country: String },

    #[error("Carbon footprint for month {0} already exists")]
    DuplicateMonthlySnapshot(String),

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("Database error: {0}")]
    Database(String),

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

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", Some(msg.clone()))
            }
            AppError::UnknownFuelType(_) => (
                StatusCode::BAD_REQUEST,
                "unknown_fuel_type",
                Some(self.to_string()),
            ),
            AppError::UnknownFlightClass(_) => (
                StatusCode::BAD_REQUEST,
                "unknown_flight_class",
                Some(self.to_string()),
            ),
            AppError::RegionNotFound(_) => (
                StatusCode::NOT_FOUND,
                "region_not_found",
                Some(self.to_string()),
            ),
            AppError::StateNotFound { .. } => (
                StatusCode::NOT_FOUND,
                "state_not_found",
                Some(self.to_string()),
            ),
            AppError::DuplicateMonthlySnapshot(_) => (
                StatusCode::CONFLICT,
                "duplicate_monthly_snapshot",
                Some(self.to_string()),
            ),
            AppError::InvalidTransition(msg) => {
                (StatusCode::CONFLICT, "invalid_transition", Some(msg.clone()))
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
