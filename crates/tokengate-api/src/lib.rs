//! Tokengate REST API
//!
//! This crate provides the Axum-based HTTP boundary for Tokengate:
//! signup, login, token rotation, logout, and a bearer-protected resource.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{RouterOptions, create_router};
pub use state::{AppState, MetricsHandle};
