//!
//! # Custom Error Handling
//!
//! This module defines the error type `AppError` used throughout the application.
//! Authentication failures are deliberately coarse: a caller can tell that a token was
//! missing, that it was not accepted, or that a login failed, but never which check
//! inside those steps rejected it. Likewise `NotFound` covers both a task that does not
//! exist and one owned by somebody else.
//!
//! `AppError` implements `actix_web::error::ResponseError` so handlers can return it
//! directly; every response carries a JSON body of the form `{"error": "..."}`.
//! `From` implementations for `sqlx::Error`, `validator::ValidationErrors`,
//! `jsonwebtoken::errors::Error` and `bcrypt::BcryptError` allow the `?` operator.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

pub const MISSING_TOKEN_MESSAGE: &str = "Authorization token missing";
pub const INVALID_TOKEN_MESSAGE: &str = "Please authenticate";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Unable to login";

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// No bearer token was presented on a protected route (HTTP 401).
    MissingToken,
    /// The bearer token is malformed, badly signed, or revoked (HTTP 401).
    InvalidToken,
    /// Unknown email or wrong password on login (HTTP 400).
    InvalidCredentials,
    /// Malformed request or a rejected update (HTTP 400).
    BadRequest(String),
    /// The resource does not exist or is not visible to the requester (HTTP 404).
    NotFound(String),
    /// Unexpected server-side failure (HTTP 500).
    InternalServerError(String),
    /// Failure inside the backing store (HTTP 500).
    DatabaseError(String),
    /// Field-level input validation failure (HTTP 422).
    ValidationError(String),
}

impl AppError {
    /// The message sent to the client. Infrastructure failures are never echoed.
    pub fn public_message(&self) -> String {
        match self {
            AppError::MissingToken => MISSING_TOKEN_MESSAGE.to_string(),
            AppError::InvalidToken => INVALID_TOKEN_MESSAGE.to_string(),
            AppError::InvalidCredentials => INVALID_CREDENTIALS_MESSAGE.to_string(),
            AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::ValidationError(msg) => msg.clone(),
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                "Internal Server Error".to_string()
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::MissingToken => write!(f, "Unauthorized: {}", MISSING_TOKEN_MESSAGE),
            AppError::InvalidToken => write!(f, "Unauthorized: {}", INVALID_TOKEN_MESSAGE),
            AppError::InvalidCredentials => {
                write!(f, "Bad Request: {}", INVALID_CREDENTIALS_MESSAGE)
            }
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingToken | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::InvalidCredentials | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::InternalServerError(msg) | AppError::DatabaseError(msg) = self {
            log::error!("{}", msg);
        }
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.public_message()
        }))
    }
}

/// `RowNotFound` becomes `NotFound`; everything else is a store failure.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// Any token decoding failure collapses into `InvalidToken`.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        log::debug!("token rejected: {}", error);
        AppError::InvalidToken
    }
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(error: actix_web::error::BlockingError) -> AppError {
        AppError::InternalServerError(format!("Blocking task failed: {}", error))
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}
