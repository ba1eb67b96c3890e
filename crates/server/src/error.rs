//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use vapteke_core::{EmailError, PersonNameError, PhoneError};

use crate::db::RepositoryError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Malformed input rejected before any mutation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unique-constraint clash (duplicate phone/email).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Resource not found (or soft-deleted).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<PhoneError> for AppError {
    fn from(e: PhoneError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<PersonNameError> for AppError {
    fn from(e: PersonNameError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<EmailError> for AppError {
    fn from(e: EmailError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Lift repository-level not-found/conflict out of the generic
        // database bucket before deciding how to respond.
        let this = match self {
            Self::Database(RepositoryError::NotFound) => Self::NotFound("record".to_owned()),
            Self::Database(RepositoryError::Conflict(msg)) => Self::Conflict(msg),
            other => other,
        };

        // Capture server errors to Sentry
        if matches!(this, Self::Database(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&this);
            tracing::error!(
                error = %this,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        match &this {
            Self::Database(_) | Self::Internal(_) => {
                // Don't expose internal error details to clients
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"message": "Internal server error"})),
                )
                    .into_response()
            }
            Self::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                Json(json!({"success": false, "message": msg})),
            )
                .into_response(),
            Self::Conflict(msg) => (
                StatusCode::CONFLICT,
                Json(json!({"success": false, "message": msg})),
            )
                .into_response(),
            Self::NotFound(what) => (
                StatusCode::NOT_FOUND,
                Json(json!({"message": format!("Not found: {what}")})),
            )
                .into_response(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("customer 42".to_string());
        assert_eq!(err.to_string(), "Not found: customer 42");

        let err = AppError::Validation("phone must contain only digits".to_string());
        assert_eq!(
            err.to_string(),
            "Validation error: phone must contain only digits"
        );
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            status_of(AppError::NotFound("x".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Validation("x".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Conflict("x".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::Internal("x".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_not_found_maps_to_404() {
        assert_eq!(
            status_of(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_repository_conflict_maps_to_409() {
        assert_eq!(
            status_of(AppError::Database(RepositoryError::Conflict(
                "phone taken".to_string()
            ))),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_validation_from_phone_error() {
        let err: AppError = PhoneError::NotDigits.into();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
