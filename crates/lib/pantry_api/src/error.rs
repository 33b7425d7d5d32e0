//! Application error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use pantry_core::auth::AuthError;
use pantry_core::models::quota::{LimitKind, RollingQuotaKind};

use crate::models::ErrorResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{kind} limit of {limit} exceeded")]
    QuotaExceeded { kind: RollingQuotaKind, limit: i64 },

    #[error("Monthly {kind} limit of {limit} reached")]
    MonthlyLimitExceeded { kind: LimitKind, limit: i64 },

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message, kind, limit) = match &self {
            AppError::Validation(m) => {
                (StatusCode::BAD_REQUEST, "validation_error", m.clone(), None, None)
            }
            AppError::Unauthorized(m) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", m.clone(), None, None)
            }
            AppError::Conflict(m) => (StatusCode::CONFLICT, "conflict", m.clone(), None, None),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.clone(), None, None),
            AppError::QuotaExceeded { kind, limit } => (
                StatusCode::PAYMENT_REQUIRED,
                "quota_exceeded",
                self.to_string(),
                Some(kind.as_str()),
                Some(*limit),
            ),
            AppError::MonthlyLimitExceeded { kind, limit } => (
                StatusCode::PAYMENT_REQUIRED,
                "monthly_limit_exceeded",
                self.to_string(),
                Some(kind.as_str()),
                Some(*limit),
            ),
            // Internal details stay out of the response body.
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error".to_string(),
                None,
                None,
            ),
        };
        let body = Json(ErrorResponse {
            error: error.to_string(),
            message,
            kind: kind.map(|k| k.to_string()),
            limit,
        });
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AppError::NotFound("row not found".into()),
            _ => AppError::Internal(e.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => AppError::Unauthorized("Invalid credentials".into()),
            AuthError::InvalidRefresh => AppError::Unauthorized("Invalid refresh token".into()),
            AuthError::TokenError(msg) => AppError::Unauthorized(msg),
            AuthError::ValidationError(msg) => AppError::Validation(msg),
            AuthError::DuplicateEmail => AppError::Conflict("Email already registered".into()),
            AuthError::UserNotFound => AppError::NotFound("User not found".into()),
            AuthError::DbError(e) => AppError::from(e),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}
