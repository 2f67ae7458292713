//! Authorization guard for Axum
//!
//! Requests must carry `Authorization: Bearer <access token>`. A request
//! with no bearer credential is rejected with 401; a credential that fails
//! verification (expired, forged, malformed) is rejected with 403. The two
//! tell a client to log in versus re-authenticate.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::error::AuthError;
use crate::jwt::{Claims, TokenCodec};

/// Authenticated user information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub name: String,
    pub claims: Claims,
}

impl AuthUser {
    /// Create from verified claims
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            name: claims.name.clone(),
            claims,
        }
    }
}

/// Extract bearer token from authorization header
fn extract_bearer_token(header: &str) -> Result<&str, AuthError> {
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeader)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }
    Ok(token)
}

/// Authentication middleware
///
/// Verifies the bearer token with the access-token codec and adds the
/// [`AuthUser`] to request extensions.
pub async fn auth_middleware(
    State(codec): State<Arc<TokenCodec>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = extract_bearer_token(header)?;
    let claims = codec.verify(token).inspect_err(|e| {
        debug!("Rejected bearer token: {}", e);
    })?;
    let user = AuthUser::from_claims(claims);

    debug!("Authenticated user: {}", user.name);

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingAuthHeader)
    }
}
