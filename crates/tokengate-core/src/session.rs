//! Session authority
//!
//! Issues access/refresh token pairs, mints new access tokens from tracked
//! refresh tokens, and revokes refresh tokens on logout. A refresh token is
//! usable iff it verifies under the refresh secret and is present in the
//! refresh-token store.

use serde::Serialize;
use std::sync::Arc;
use tokengate_auth::{Claims, TokenCodec, hash_password, verify_password};
use tokengate_db::{DbError, NewUser, User};
use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::store::{CredentialStore, RefreshTokenStore};

/// Tokens returned by a successful login
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Core token lifecycle state machine
pub struct SessionAuthority {
    credentials: Arc<dyn CredentialStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    access: TokenCodec,
    refresh: TokenCodec,
}

impl SessionAuthority {
    /// Create a new session authority
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        access: TokenCodec,
        refresh: TokenCodec,
    ) -> Self {
        info!(
            "Initializing session authority (access token ttl: {}s)",
            access.ttl().map(|ttl| ttl.num_seconds()).unwrap_or_default()
        );

        Self {
            credentials,
            refresh_tokens,
            access,
            refresh,
        }
    }

    /// Codec used for access tokens, shared with the authorization guard
    pub fn access_codec(&self) -> &TokenCodec {
        &self.access
    }

    /// Register a new user
    pub async fn signup(&self, name: &str, password: &str) -> Result<User, SessionError> {
        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;

        let user = self
            .credentials
            .create(NewUser {
                name: name.to_string(),
                password_hash,
            })
            .await
            .map_err(|e| match e {
                DbError::Duplicate(_) => SessionError::Conflict(name.to_string()),
                other => SessionError::Database(other),
            })?;

        info!("Created user: {}", user.name);
        Ok(user)
    }

    /// Verify credentials and issue a token pair
    pub async fn login(&self, name: &str, password: &str) -> Result<TokenPair, SessionError> {
        let user = self
            .credentials
            .find(name)
            .await?
            .ok_or_else(|| SessionError::NotFound(name.to_string()))?;

        let password = password.to_string();
        let password_hash = user.password_hash.clone();
        let verified =
            tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
                .await??;

        if !verified {
            warn!("Failed login for user: {}", user.name);
            return Err(SessionError::Unauthorized);
        }

        let access_token = self.access.sign(&user.name)?;
        let refresh_token = self.refresh.sign(&user.name)?;
        self.refresh_tokens.insert(&refresh_token, &user.name).await?;

        info!("User {} logged in successfully", user.name);

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Mint a new access token from a tracked refresh token
    ///
    /// Membership is checked before the signature, so an untracked token is
    /// always `NotRecognized` regardless of whether it would verify.
    pub async fn rotate(&self, refresh_token: Option<&str>) -> Result<String, SessionError> {
        let token = refresh_token
            .filter(|t| !t.is_empty())
            .ok_or(SessionError::MissingToken)?;

        if !self.refresh_tokens.contains(token).await? {
            debug!("Rejected untracked refresh token");
            return Err(SessionError::NotRecognized);
        }

        let claims = self
            .refresh
            .verify(token)
            .map_err(SessionError::InvalidSignature)?;

        let access_token = self.access.sign(&claims.name)?;

        debug!("Rotated access token for user: {}", claims.name);
        Ok(access_token)
    }

    /// Revoke a refresh token; absent tokens are ignored
    pub async fn logout(&self, refresh_token: &str) -> Result<(), SessionError> {
        if self.refresh_tokens.remove(refresh_token).await? {
            info!("Revoked refresh token");
        } else {
            debug!("Logout for unknown refresh token");
        }
        Ok(())
    }

    /// Verify an access token
    pub fn verify_access(&self, token: &str) -> Result<Claims, SessionError> {
        Ok(self.access.verify(token)?)
    }

    /// Number of outstanding refresh tokens
    pub async fn outstanding_refresh_tokens(&self) -> Result<usize, SessionError> {
        Ok(self.refresh_tokens.count().await?)
    }
}
