//! Core error types

use thiserror::Error;
use tokengate_auth::AuthError;
use tokengate_db::DbError;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("User '{0}' already exists")]
    Conflict(String),

    #[error("Cannot find user '{0}'")]
    NotFound(String),

    #[error("Not Allowed")]
    Unauthorized,

    #[error("Refresh token missing")]
    MissingToken,

    #[error("Refresh token not recognized")]
    NotRecognized,

    #[error("Refresh token failed verification: {0}")]
    InvalidSignature(#[source] AuthError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
