//! Signed token codec
//!
//! Access and refresh tokens are HS256 JWTs over [`Claims`]. Each token
//! class gets its own [`TokenCodec`] with its own secret, so a leaked
//! refresh secret cannot forge access tokens and vice versa.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::AuthError;

/// Lifetime of an access token unless configured otherwise
pub const ACCESS_TOKEN_TTL_MINUTES: i64 = 15;

/// Identity claims carried by every token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// User name
    pub name: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp); absent on refresh tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Unique token id
    pub jti: String,
}

/// Signs and verifies one class of token
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Option<Duration>,
}

impl TokenCodec {
    /// Create a codec; `ttl: None` issues tokens without an expiry claim
    pub fn new(secret: &str, ttl: Option<Duration>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Codec for short-lived access tokens
    pub fn access(secret: &str, ttl: Duration) -> Self {
        Self::new(secret, Some(ttl))
    }

    /// Codec for refresh tokens, which only expire through revocation
    pub fn refresh(secret: &str) -> Self {
        Self::new(secret, None)
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Sign a fresh token for `name`
    pub fn sign(&self, name: &str) -> Result<String, AuthError> {
        let now = Utc::now();

        let exp = match self.ttl {
            Some(ttl) => Some(
                now.checked_add_signed(ttl)
                    .ok_or(AuthError::ExpiryOverflow)?
                    .timestamp(),
            ),
            None => None,
        };

        let claims = Claims {
            name: name.to_string(),
            iat: now.timestamp(),
            exp,
            jti: Uuid::new_v4().to_string(),
        };

        debug!("Signing token for user: {}", name);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(AuthError::Signing)
    }

    /// Verify a token and return its claims
    ///
    /// The signature is checked before any claim is read. Expiry is then
    /// checked separately so the two failures stay distinguishable.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::MalformedToken,
            })?
            .claims;

        match (self.ttl, claims.exp) {
            (Some(_), None) => Err(AuthError::MalformedToken),
            (_, Some(exp)) if Utc::now().timestamp() >= exp => Err(AuthError::TokenExpired),
            _ => Ok(claims),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn access_codec() -> TokenCodec {
        TokenCodec::access("access-secret", Duration::minutes(ACCESS_TOKEN_TTL_MINUTES))
    }

    #[test]
    fn test_access_token_generation_and_validation() {
        let codec = access_codec();

        let token = codec.sign("alice").unwrap();
        let claims = codec.verify(&token).unwrap();

        assert_eq!(claims.name, "alice");
        let exp = claims.exp.unwrap();
        assert_eq!(exp - claims.iat, ACCESS_TOKEN_TTL_MINUTES * 60);
    }

    #[test]
    fn test_refresh_token_has_no_expiry() {
        let codec = TokenCodec::refresh("refresh-secret");

        let token = codec.sign("alice").unwrap();
        let claims = codec.verify(&token).unwrap();

        assert_eq!(claims.name, "alice");
        assert!(claims.exp.is_none());
    }

    #[test]
    fn test_zero_ttl_token_is_expired() {
        let codec = TokenCodec::access("access-secret", Duration::zero());

        let token = codec.sign("alice").unwrap();
        assert!(matches!(codec.verify(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_unrepresentable_expiry_is_error() {
        let codec = TokenCodec::access("access-secret", Duration::MAX);

        let err = codec.sign("alice").unwrap_err();
        assert!(matches!(err, AuthError::ExpiryOverflow));
        assert!(!err.is_verification_failure());
    }

    #[test]
    fn test_wrong_secret_is_invalid_signature() {
        let token = access_codec().sign("alice").unwrap();
        let other = TokenCodec::access("other-secret", Duration::minutes(15));

        assert!(matches!(other.verify(&token), Err(AuthError::InvalidSignature)));
    }

    #[test]
    fn test_token_classes_do_not_cross_verify() {
        let access = access_codec();
        let refresh = TokenCodec::refresh("refresh-secret");

        let refresh_token = refresh.sign("alice").unwrap();
        let access_token = access.sign("alice").unwrap();

        assert!(matches!(access.verify(&refresh_token), Err(AuthError::InvalidSignature)));
        assert!(matches!(refresh.verify(&access_token), Err(AuthError::InvalidSignature)));
    }

    #[test]
    fn test_access_codec_rejects_token_without_expiry() {
        // Same secret, but signed without an exp claim
        let unbounded = TokenCodec::refresh("access-secret").sign("alice").unwrap();

        assert!(matches!(
            access_codec().verify(&unbounded),
            Err(AuthError::MalformedToken)
        ));
    }

    #[test]
    fn test_malformed_tokens() {
        let codec = access_codec();

        assert!(matches!(codec.verify("invalid-token"), Err(AuthError::MalformedToken)));
        assert!(matches!(codec.verify(""), Err(AuthError::MalformedToken)));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let codec = access_codec();
        let token = codec.sign("alice").unwrap();

        let truncated = &token[..token.len() - 4];
        let err = codec.verify(truncated).unwrap_err();
        assert!(err.is_verification_failure());

        let mut parts: Vec<&str> = token.split('.').collect();
        let forged_payload = codec.sign("mallory").unwrap();
        let forged_parts: Vec<&str> = forged_payload.split('.').collect();
        parts[1] = forged_parts[1];
        let spliced = parts.join(".");
        assert!(matches!(codec.verify(&spliced), Err(AuthError::InvalidSignature)));
    }

    #[test]
    fn test_each_token_is_distinct() {
        let codec = TokenCodec::refresh("refresh-secret");

        let first = codec.sign("alice").unwrap();
        let second = codec.sign("alice").unwrap();

        assert_ne!(first, second);
    }
}
