//!
//! # Error Handling
//!
//! This module defines the application-wide error type `AppError` and the
//! field-level `FieldError` used for validation failures. Every fallible
//! operation in the crate surfaces one of these variants, and the
//! `actix_web::error::ResponseError` implementation converts them into the
//! uniform JSON envelope `{"success": false, "message": ..., "errors": ...}`.
//!
//! `From` implementations are provided for `sqlx::Error`,
//! `validator::ValidationErrors`, `jsonwebtoken::errors::Error`, and
//! `bcrypt::BcryptError`, allowing for easy conversion using the `?`
//! operator. Unexpected store or infrastructure failures are logged with
//! their detail and surfaced to the caller as a generic internal error.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Name of the offending input field.
    pub field: String,
    /// Human-readable description of the violated rule.
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Represents all error conditions the application can surface.
#[derive(Debug, PartialEq, Eq)]
pub enum AppError {
    /// One or more input fields failed validation (HTTP 400).
    Validation(Vec<FieldError>),
    /// Registration attempted with an email that already has an account (HTTP 400).
    DuplicateEmail,
    /// Login failed. Unknown email and wrong password both map here so the
    /// response never reveals which check failed (HTTP 401).
    InvalidCredentials,
    /// The session token is malformed or carries a bad signature (HTTP 401).
    InvalidToken,
    /// The session token is past its expiry (HTTP 401).
    TokenExpired,
    /// The requested record does not exist for this caller (HTTP 404).
    /// Ownership mismatches map here as well, indistinguishable from a
    /// missing record.
    NotFound(String),
    /// Unexpected store or infrastructure failure (HTTP 500). The detail is
    /// logged server-side and never included in the response body.
    Internal(String),
}

impl AppError {
    pub fn internal(detail: impl Into<String>) -> Self {
        AppError::Internal(detail.into())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Validation(_) => write!(f, "Validation failed"),
            AppError::DuplicateEmail => write!(f, "An account already exists with this email"),
            AppError::InvalidCredentials => write!(f, "Invalid email or password"),
            AppError::InvalidToken => write!(f, "Invalid token"),
            AppError::TokenExpired => write!(f, "Token has expired"),
            AppError::NotFound(msg) => write!(f, "{}", msg),
            AppError::Internal(detail) => write!(f, "Internal error: {}", detail),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::DuplicateEmail => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken | AppError::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Validation(errors) => HttpResponse::BadRequest().json(json!({
                "success": false,
                "message": "Validation failed",
                "errors": errors,
            })),
            AppError::Internal(detail) => {
                log::error!("internal error: {}", detail);
                HttpResponse::InternalServerError().json(json!({
                    "success": false,
                    "message": "Internal server error",
                }))
            }
            other => HttpResponse::build(self.status_code()).json(json!({
                "success": false,
                "message": other.to_string(),
            })),
        }
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` maps to `NotFound`; everything else is an internal failure
/// whose driver detail stays out of the response body.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::Internal(error.to_string()),
        }
    }
}

/// Converts the declarative request-shape checks into the field-error list.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        let fields = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, violations)| {
                violations.iter().map(move |violation| {
                    let message = violation
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field));
                    FieldError::new(field, message)
                })
            })
            .collect();
        AppError::Validation(fields)
    }
}

/// Converts JWT processing failures, keeping expiry distinct from garbage.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        match error.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::InvalidToken,
        }
    }
}

/// Converts `bcrypt::BcryptError` into an internal error. Hashing problems
/// are never the caller's fault.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(format!("password hashing failed: {}", error))
    }
}
