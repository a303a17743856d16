//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every failure a handler can produce, from a rejected token to a broken database
//! connection, ends up as one of its variants.
//!
//! `AppError` implements `actix_web::error::ResponseError`, so errors are rendered with the
//! same JSON envelope as successful responses (see [`crate::response::ApiResponse`]).
//! `From` implementations for `sqlx::Error`, `validator::ValidationErrors`,
//! `jsonwebtoken::errors::Error`, `bcrypt::BcryptError` and the `lettre` errors allow
//! conversion with the `?` operator.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use jsonwebtoken::errors::ErrorKind;
use std::fmt;
use validator::ValidationErrors;

use crate::response::ApiResponse;

/// Message returned for any token that fails signature, issuer or format checks.
pub const INVALID_TOKEN: &str = "token is invalid";
/// Message returned for a well-formed token whose `exp` has passed.
pub const EXPIRED_TOKEN: &str = "expired token";
const INTERNAL_SERVER_ERROR: &str = "internal server error";

/// SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Authentication failed or is missing (HTTP 401).
    Unauthorized(String),
    /// Malformed or semantically invalid request (HTTP 400).
    BadRequest(String),
    /// The requested resource does not exist or is not owned by the caller (HTTP 404).
    NotFound(String),
    /// The request collides with existing data, e.g. a duplicate email (HTTP 409).
    Conflict(String),
    /// Unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// Database failure (HTTP 500). The detail is logged, never sent to the client.
    DatabaseError(String),
    /// Input validation failed (HTTP 422 Unprocessable Entity).
    ValidationError(String),
    /// The service was started with missing or invalid settings.
    Configuration(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::Configuration(msg) => write!(f, "Configuration Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// The message exposed to API clients.
    pub fn client_message(&self) -> &str {
        match self {
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::ValidationError(msg) => msg,
            AppError::InternalServerError(_)
            | AppError::DatabaseError(_)
            | AppError::Configuration(_) => INTERNAL_SERVER_ERROR,
        }
    }
}

/// Converts `AppError` variants into enveloped JSON responses.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InternalServerError(_)
            | AppError::DatabaseError(_)
            | AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{}", self);
        }
        HttpResponse::build(status).json(ApiResponse::<()>::failure(status, self.client_message()))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` maps to `NotFound` and unique violations to `Conflict`; everything else is a
/// `DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("data not exist".into()),
            sqlx::Error::Database(ref db_error)
                if db_error.code().as_deref() == Some(UNIQUE_VIOLATION) =>
            {
                AppError::Conflict("already exists".into())
            }
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// Converts `jsonwebtoken::errors::Error` into `AppError::Unauthorized`.
///
/// Expiry is reported separately so clients know a refresh may succeed.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        match error.kind() {
            ErrorKind::ExpiredSignature => AppError::Unauthorized(EXPIRED_TOKEN.into()),
            _ => AppError::Unauthorized(INVALID_TOKEN.into()),
        }
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}

impl From<lettre::error::Error> for AppError {
    fn from(error: lettre::error::Error) -> AppError {
        AppError::InternalServerError(format!("Failed to build email: {}", error))
    }
}

impl From<lettre::address::AddressError> for AppError {
    fn from(error: lettre::address::AddressError) -> AppError {
        AppError::InternalServerError(format!("Invalid email address: {}", error))
    }
}

impl From<lettre::transport::smtp::Error> for AppError {
    fn from(error: lettre::transport::smtp::Error) -> AppError {
        AppError::InternalServerError(format!("Failed to send email: {}", error))
    }
}
