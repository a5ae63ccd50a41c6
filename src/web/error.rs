//! API error taxonomy.
//!
//! Every handler surfaces one of these variants; each maps onto exactly
//! one response status and a JSON `{"detail": ...}` body.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;

/// API errors
#[derive(Debug)]
pub enum ApiError {
    /// Bad, malformed or out-of-range input, including uniqueness
    /// violations.
    Validation(String),
    /// A referenced resource does not exist.
    NotFound(String),
    /// No or invalid bearer token on a route that needs one.
    AuthenticationRequired,
    /// Authenticated, but the policy denies the action.
    Forbidden,
    /// Token exchange with a code that does not match.
    InvalidCredentials(String),
    /// Unexpected persistence failure.
    Internal(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Validation(msg) => write!(f, "{}", msg),
            ApiError::NotFound(msg) => write!(f, "{}", msg),
            ApiError::AuthenticationRequired => write!(f, "Authentication required"),
            ApiError::Forbidden => {
                write!(f, "You do not have permission to perform this action")
            }
            ApiError::InvalidCredentials(msg) => write!(f, "{}", msg),
            ApiError::Internal(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<DbErr> for ApiError {
    fn from(e: DbErr) -> Self {
        // The store's unique indexes are the serialization point for
        // concurrent writes; a tripped constraint is a validation
        // failure, not a server fault.
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => ApiError::Validation(msg),
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => ApiError::Validation(msg),
            _ => {
                log::error!("Database error: {}", e);
                ApiError::Internal("database error".to_string())
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(e: validator::ValidationErrors) -> Self {
        ApiError::Validation(e.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidCredentials(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            detail: self.to_string(),
        })
    }
}
