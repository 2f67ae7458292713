//! Authentication error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Malformed token")]
    MalformedToken,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Missing authorization header")]
    MissingAuthHeader,

    #[error("Invalid authorization header format")]
    InvalidAuthHeader,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token signing error: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("Token expiry is out of range")]
    ExpiryOverflow,
}

impl AuthError {
    /// True when a presented token could not be trusted
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            AuthError::TokenExpired | AuthError::MalformedToken | AuthError::InvalidSignature
        )
    }

    /// True when no bearer credential was presented at all
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, AuthError::MissingAuthHeader | AuthError::InvalidAuthHeader)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AuthError::MissingAuthHeader => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHENTICATED",
                "Missing authorization header",
            ),
            AuthError::InvalidAuthHeader => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHENTICATED",
                "Invalid authorization header format",
            ),
            AuthError::TokenExpired => (StatusCode::FORBIDDEN, "FORBIDDEN", "Token expired"),
            AuthError::MalformedToken | AuthError::InvalidSignature => {
                (StatusCode::FORBIDDEN, "FORBIDDEN", "Invalid token")
            }
            AuthError::PasswordHash(_) | AuthError::Signing(_) | AuthError::ExpiryOverflow => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal error",
            ),
        };

        let body = axum::Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
