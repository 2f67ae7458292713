//! Tokengate Database Layer
//!
//! This crate provides the credential store for Tokengate: user records
//! and, optionally, the persistent set of outstanding refresh tokens,
//! using SQLite via sqlx.

pub mod error;
pub mod models;
pub mod repository;
pub mod utils;

pub use error::DbError;
pub use models::*;
pub use repository::Database;
