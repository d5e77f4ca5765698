//! Centralized error handling.
//!
//! Every failure that can reach a client is an [`AppError`]. Component
//! errors (hashing, tokens, persistence) are translated exactly once, via
//! the `From` impls below, so flows can use `?` and already-classified
//! errors pass through untouched.
//!
//! Two renderings exist: the REST envelope (`IntoResponse`) and GraphQL
//! error extensions (`ErrorExtensions`).

use async_graphql::ErrorExtensions;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

use crate::config::{ERR_RECORD_NOT_FOUND, ERR_TOKEN_EXPIRED, ERR_TOKEN_INVALID};
use crate::domain::{HashError, StoreError};
use crate::services::TokenError;

/// Application error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("Email already exists.")]
    DuplicateEmail,

    /// Same status for unknown email and wrong password.
    #[error("{0}")]
    InvalidCredentials(&'static str),

    #[error("Biometric key cannot be empty.")]
    EmptyBiometricKey,

    #[error("User not found. Please sign up first.")]
    UserNotFound,

    #[error("{0}")]
    NotFound(String),

    #[error("No users found with biometric authentication enabled.")]
    NoBiometricUsersRegistered,

    /// Missing, expired or invalid bearer token.
    #[error("{0}")]
    Unauthenticated(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("Internal server error")]
    Internal(String),
}

/// REST error envelope
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorEnvelope {
    status_code: u16,
    message: String,
    timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    stack: Option<String>,
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::DuplicateEmail => "DUPLICATE_EMAIL",
            AppError::InvalidCredentials(_) => "INVALID_CREDENTIALS",
            AppError::EmptyBiometricKey => "EMPTY_BIOMETRIC_KEY",
            AppError::UserNotFound => "USER_NOT_FOUND",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::NoBiometricUsersRegistered => "NO_BIOMETRIC_USERS",
            AppError::Unauthenticated(_) => "UNAUTHENTICATED",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::InvalidCredentials(_)
            | AppError::NoBiometricUsersRegistered
            | AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::EmptyBiometricKey | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::UserNotFound | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                self.to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Operator diagnostics for the REST path. Only internal errors carry
    /// any, and only in debug builds.
    fn stack(&self) -> Option<String> {
        match self {
            AppError::Internal(detail) if cfg!(debug_assertions) => Some(detail.clone()),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorEnvelope {
            status_code: status.as_u16(),
            message: self.user_message(),
            timestamp: Utc::now().to_rfc3339(),
            stack: self.stack(),
        };

        (status, Json(body)).into_response()
    }
}

impl ErrorExtensions for AppError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.user_message()).extend_with(|_, ext| {
            ext.set("statusCode", self.status().as_u16());
            ext.set("code", self.code());
        })
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ConstraintViolation(_) => AppError::DuplicateEmail,
            StoreError::NotFound => AppError::NotFound(ERR_RECORD_NOT_FOUND.to_string()),
            StoreError::Backend(message) => AppError::Internal(message),
        }
    }
}

impl From<HashError> for AppError {
    fn from(err: HashError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AppError::Unauthenticated(ERR_TOKEN_EXPIRED),
            TokenError::Invalid => AppError::Unauthenticated(ERR_TOKEN_INVALID),
            TokenError::IncompleteClaims(_) | TokenError::Signing(_) => {
                AppError::Internal(err.to_string())
            }
        }
    }
}

/// Convenience constructors
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }
}
