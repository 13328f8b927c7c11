use crate::repositories::RepositoryError;
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Errori del dominio di autenticazione.
///
/// "Utente non trovato" e "password errata" al login collassano entrambi in
/// `InvalidCredentials`, token scaduto e token malformato in `InvalidToken`:
/// il chiamante non deve poter distinguere i due casi.
#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(&'static str),

    #[error("user already exists")]
    AlreadyExists,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is inactive")]
    InactiveAccount,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("user not found")]
    NotFound,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for AuthError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::Conflict(_) => Self::AlreadyExists,
            RepositoryError::Database(e) => Self::Internal(e.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: &'static str,
    details: Option<String>,
}

impl AppError {
    pub fn new(status: StatusCode, message: &'static str) -> Self {
        Self {
            status,
            message,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &'static str {
        self.message
    }

    // Common error constructors
    pub fn not_found(message: &'static str) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: &'static str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: &'static str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: &'static str) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn conflict(message: &'static str) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal_server_error(message: &'static str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn service_unavailable(message: &'static str) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(msg) => Self::bad_request(msg),
            AuthError::AlreadyExists => Self::conflict("User already exists"),
            AuthError::InvalidCredentials => Self::unauthorized("Invalid email or password"),
            AuthError::InactiveAccount => Self::unauthorized("Account is inactive"),
            AuthError::InvalidToken => Self::unauthorized("Invalid or expired token"),
            AuthError::NotFound => Self::not_found("User not found"),
            AuthError::Internal(detail) => {
                // il dettaglio resta nei log
                error!("Internal auth error: {}", detail);
                Self::internal_server_error("Internal server error")
            }
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::not_found("Resource not found"),
            RepositoryError::Conflict(_) => Self::conflict("Resource already exists"),
            RepositoryError::Database(e) => e.into(),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::not_found("Resource not found"),

            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                error!("Database unavailable: {}", err);
                Self::service_unavailable("Database unavailable")
            }

            _ => {
                error!("Database error: {}", err);
                Self::internal_server_error("Internal server error")
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::bad_request("Validation error").with_details(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = Json(ErrorResponse {
            error: self.message,
            details: self.details,
        });
        (self.status, body).into_response()
    }
}
