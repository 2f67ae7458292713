//! Request/Response DTOs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokengate_auth::Claims;

// ==================== Session Types ====================

/// Signup request
#[derive(Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub password: String,
}

/// Signup response (without password hash)
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub name: String,
    pub created_at: String,
}

/// Login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub name: String,
    pub password: String,
}

/// Body carrying a refresh token (token rotation and logout)
#[derive(Deserialize, Default)]
pub struct RefreshTokenRequest {
    #[serde(default)]
    pub token: Option<Value>,
}

/// How the `token` field of a [`RefreshTokenRequest`] was filled in
#[derive(Debug, PartialEq, Eq)]
pub enum PresentedToken<'a> {
    /// Field missing or `null`
    Absent,
    Text(&'a str),
    /// Present but not a string
    Other,
}

impl RefreshTokenRequest {
    pub fn presented(&self) -> PresentedToken<'_> {
        match &self.token {
            None | Some(Value::Null) => PresentedToken::Absent,
            Some(Value::String(token)) => PresentedToken::Text(token),
            Some(_) => PresentedToken::Other,
        }
    }
}

/// Token rotation response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub access_token: String,
}

// ==================== Protected Types ====================

/// Protected resource response
#[derive(Serialize)]
pub struct ProtectedResponse {
    pub title: String,
    pub user: Claims,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> RefreshTokenRequest {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_presented_token() {
        assert_eq!(parse("{}").presented(), PresentedToken::Absent);
        assert_eq!(parse(r#"{"token":null}"#).presented(), PresentedToken::Absent);
        assert_eq!(parse(r#"{"token":"abc"}"#).presented(), PresentedToken::Text("abc"));
        assert_eq!(parse(r#"{"token":123}"#).presented(), PresentedToken::Other);
        assert_eq!(parse(r#"{"token":["abc"]}"#).presented(), PresentedToken::Other);
    }
}
