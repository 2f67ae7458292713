//! API error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tokengate_auth::AuthError;
use tokengate_core::SessionError;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),
}

fn internal(message: String) -> (StatusCode, &'static str, String) {
    error!("Internal error: {}", message);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "Internal error".to_string(),
    )
}

fn auth_status(e: &AuthError) -> (StatusCode, &'static str, String) {
    if e.is_unauthenticated() {
        (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", e.to_string())
    } else if e.is_verification_failure() {
        (StatusCode::FORBIDDEN, "FORBIDDEN", e.to_string())
    } else {
        internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            ApiError::Session(e) => match e {
                SessionError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT", e.to_string()),
                SessionError::NotFound(_) => (
                    StatusCode::BAD_REQUEST,
                    "NOT_FOUND",
                    "Cannot find user".to_string(),
                ),
                SessionError::Unauthorized => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", e.to_string())
                }
                SessionError::MissingToken => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", e.to_string())
                }
                SessionError::NotRecognized | SessionError::InvalidSignature(_) => {
                    (StatusCode::FORBIDDEN, "FORBIDDEN", e.to_string())
                }
                SessionError::Auth(auth) => auth_status(auth),
                SessionError::Database(_) | SessionError::Task(_) => internal(e.to_string()),
            },
            ApiError::Auth(e) => auth_status(e),
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

#[cfg(test)]
mod tests {
    use super::*;
    use tokengate_db::DbError;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_session_error_statuses() {
        assert_eq!(
            status_of(SessionError::Conflict("alice".into()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(SessionError::NotFound("alice".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(SessionError::Unauthorized.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(SessionError::MissingToken.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(SessionError::NotRecognized.into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(SessionError::InvalidSignature(AuthError::TokenExpired).into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(SessionError::Database(DbError::Migration("x".into())).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(SessionError::Auth(AuthError::PasswordHash("bad".into())).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_error_statuses() {
        assert_eq!(
            status_of(AuthError::MissingAuthHeader.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AuthError::InvalidSignature.into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(AuthError::ExpiryOverflow.into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
