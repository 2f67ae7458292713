//! Signup, login, token rotation and logout routes

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::{delete, post},
};
use tokengate_core::{SessionError, TokenPair};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{
    AccessTokenResponse, LoginRequest, PresentedToken, RefreshTokenRequest, SignupRequest,
    SignupResponse,
};

// ==================== Input Validation ====================

/// Maximum allowed name length
const MAX_NAME_LENGTH: usize = 64;
/// Maximum allowed password length (prevent DoS with very large passwords)
const MAX_PASSWORD_LENGTH: usize = 256;

/// Validate name format and length
fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.is_empty() {
        return Err(ApiError::BadRequest("Name cannot be empty".to_string()));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Name exceeds maximum length of {} characters",
            MAX_NAME_LENGTH
        )));
    }
    if !name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return Err(ApiError::BadRequest(
            "Name can only contain alphanumeric characters, underscores, and hyphens".to_string(),
        ));
    }
    Ok(())
}

/// Validate password length
fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.is_empty() {
        return Err(ApiError::BadRequest("Password cannot be empty".to_string()));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

// ==================== Session Routes ====================

/// POST /signup
async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    validate_name(&request.name)?;
    validate_password(&request.password)?;

    debug!("Signup for user: {}", request.name);

    let user = state.sessions.signup(&request.name, &request.password).await?;

    metrics::counter!("tokengate_signups_total").increment(1);

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            name: user.name,
            created_at: user.created_at.to_rfc3339(),
        }),
    ))
}

/// POST /login
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    debug!("Login attempt for user: {}", request.name);

    let result = state.sessions.login(&request.name, &request.password).await;

    let outcome = match &result {
        Ok(_) => "success",
        Err(SessionError::NotFound(_)) => "unknown_user",
        Err(SessionError::Unauthorized) => "bad_password",
        Err(_) => "error",
    };
    metrics::counter!("tokengate_logins_total", "outcome" => outcome).increment(1);

    Ok(Json(result?))
}

/// POST /token
///
/// A missing or unparseable body counts as a missing token; a `token`
/// field that is not a string can never be recognized.
async fn token(
    State(state): State<AppState>,
    payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> Result<Json<AccessTokenResponse>, ApiError> {
    let request = payload.map(|Json(r)| r).unwrap_or_default();

    let result = match request.presented() {
        PresentedToken::Absent => state.sessions.rotate(None).await,
        PresentedToken::Text(token) => state.sessions.rotate(Some(token)).await,
        PresentedToken::Other => Err(SessionError::NotRecognized),
    };

    let outcome = if result.is_ok() { "success" } else { "rejected" };
    metrics::counter!("tokengate_token_rotations_total", "outcome" => outcome).increment(1);

    Ok(Json(AccessTokenResponse {
        access_token: result?,
    }))
}

/// DELETE /logout
async fn logout(
    State(state): State<AppState>,
    payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let request = payload.map(|Json(r)| r).unwrap_or_default();

    if let PresentedToken::Text(token) = request.presented() {
        state.sessions.logout(token).await?;
    }

    metrics::counter!("tokengate_logouts_total").increment(1);

    Ok(StatusCode::NO_CONTENT)
}

/// Create session routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/token", post(token))
        .route("/logout", delete(logout))
}
