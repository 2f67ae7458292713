//! Tokengate Authentication
//!
//! This crate provides the token codec (signed, self-contained access and
//! refresh tokens), Argon2 password hashing, and the bearer-token
//! authorization guard for Axum.

pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use error::AuthError;
pub use jwt::{ACCESS_TOKEN_TTL_MINUTES, Claims, TokenCodec};
pub use middleware::{AuthUser, auth_middleware};
pub use password::{hash_password, verify_password};
