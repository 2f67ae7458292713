//! Tokengate Core Business Logic
//!
//! This crate provides the session authority: signup, login, access-token
//! rotation and refresh-token revocation, on top of injectable credential
//! and refresh-token stores.

pub mod error;
pub mod session;
pub mod store;

pub use error::SessionError;
pub use session::{SessionAuthority, TokenPair};
pub use store::{
    CredentialStore, DatabaseRefreshTokenStore, MemoryCredentialStore, MemoryRefreshTokenStore,
    RefreshStoreKind, RefreshTokenStore,
};
