//! Authentication and session lifecycle.
//!
//! Provides password hashing, access-token issue/verify, the refresh-token
//! rotation engine, and credential-store queries shared by the API layer.

pub mod jwt;
pub mod password;
pub mod queries;
pub mod tokens;

use thiserror::Error;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid refresh token")]
    InvalidRefresh,

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("User not found")]
    UserNotFound,

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
