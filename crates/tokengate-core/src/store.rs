//! Credential and refresh-token stores
//!
//! The session authority only talks to these traits. The in-memory
//! implementations back tests and single-process deployments; the
//! database implementations persist across restarts and can be shared by
//! several processes.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use tokengate_db::{Database, DbError, NewUser, User};

/// Durable mapping from user name to password hash
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a new record; [`DbError::Duplicate`] if the name is taken
    async fn create(&self, user: NewUser) -> Result<User, DbError>;

    /// Look up a record by name
    async fn find(&self, name: &str) -> Result<Option<User>, DbError>;
}

/// The set of refresh tokens currently allowed to mint access tokens
///
/// Membership is exact token equality.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Add a token to the set
    async fn insert(&self, token: &str, name: &str) -> Result<(), DbError>;

    /// Whether the token is in the set
    async fn contains(&self, token: &str) -> Result<bool, DbError>;

    /// Remove the token; returns whether it was present
    async fn remove(&self, token: &str) -> Result<bool, DbError>;

    /// Number of outstanding tokens
    async fn count(&self) -> Result<usize, DbError>;
}

// ==================== Database-backed stores ====================

#[async_trait]
impl CredentialStore for Database {
    async fn create(&self, user: NewUser) -> Result<User, DbError> {
        self.insert_user(user).await
    }

    async fn find(&self, name: &str) -> Result<Option<User>, DbError> {
        self.get_user_by_name(name).await
    }
}

/// Refresh-token set persisted in the `refresh_tokens` table
#[derive(Clone)]
pub struct DatabaseRefreshTokenStore {
    db: Database,
}

impl DatabaseRefreshTokenStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RefreshTokenStore for DatabaseRefreshTokenStore {
    async fn insert(&self, token: &str, name: &str) -> Result<(), DbError> {
        self.db.insert_refresh_token(token, name).await
    }

    async fn contains(&self, token: &str) -> Result<bool, DbError> {
        self.db.refresh_token_exists(token).await
    }

    async fn remove(&self, token: &str) -> Result<bool, DbError> {
        self.db.delete_refresh_token(token).await
    }

    async fn count(&self) -> Result<usize, DbError> {
        Ok(self.db.count_refresh_tokens().await?.max(0) as usize)
    }
}

// ==================== In-memory stores ====================

/// Credential store held in process memory
#[derive(Default)]
pub struct MemoryCredentialStore {
    users: Mutex<HashMap<String, User>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn create(&self, user: NewUser) -> Result<User, DbError> {
        let mut users = self.users.lock();
        if users.contains_key(&user.name) {
            return Err(DbError::Duplicate(format!("User '{}' already exists", user.name)));
        }

        let record = User {
            id: users.len() as i64 + 1,
            name: user.name,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        users.insert(record.name.clone(), record.clone());
        Ok(record)
    }

    async fn find(&self, name: &str) -> Result<Option<User>, DbError> {
        Ok(self.users.lock().get(name).cloned())
    }
}

/// Refresh-token set guarded by a single lock
#[derive(Default)]
pub struct MemoryRefreshTokenStore {
    tokens: Mutex<HashSet<String>>,
}

impl MemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryRefreshTokenStore {
    async fn insert(&self, token: &str, _name: &str) -> Result<(), DbError> {
        self.tokens.lock().insert(token.to_string());
        Ok(())
    }

    async fn contains(&self, token: &str) -> Result<bool, DbError> {
        Ok(self.tokens.lock().contains(token))
    }

    async fn remove(&self, token: &str) -> Result<bool, DbError> {
        Ok(self.tokens.lock().remove(token))
    }

    async fn count(&self) -> Result<usize, DbError> {
        Ok(self.tokens.lock().len())
    }
}

// ==================== Store selection ====================

/// Error type for parsing a refresh store kind
#[derive(Debug, Clone)]
pub struct ParseRefreshStoreKindError(String);

impl fmt::Display for ParseRefreshStoreKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid refresh token store: {}", self.0)
    }
}

impl std::error::Error for ParseRefreshStoreKindError {}

/// Where outstanding refresh tokens are kept
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RefreshStoreKind {
    /// Process memory; revocations are lost on restart
    #[default]
    Memory,
    /// The `refresh_tokens` table
    Database,
}

impl RefreshStoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshStoreKind::Memory => "memory",
            RefreshStoreKind::Database => "database",
        }
    }
}

impl FromStr for RefreshStoreKind {
    type Err = ParseRefreshStoreKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(RefreshStoreKind::Memory),
            "database" | "db" => Ok(RefreshStoreKind::Database),
            _ => Err(ParseRefreshStoreKindError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    async fn exercise_refresh_store(store: &dyn RefreshTokenStore) {
        assert!(!store.contains("a").await.unwrap());

        store.insert("a", "alice").await.unwrap();
        store.insert("b", "bob").await.unwrap();
        assert!(store.contains("a").await.unwrap());
        assert!(!store.contains("a ").await.unwrap());
        assert_eq!(store.count().await.unwrap(), 2);

        assert!(store.remove("a").await.unwrap());
        assert!(!store.remove("a").await.unwrap());
        assert!(!store.contains("a").await.unwrap());
        assert!(store.contains("b").await.unwrap());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_memory_refresh_store() {
        exercise_refresh_store(&MemoryRefreshTokenStore::new()).await;
    }

    #[tokio::test]
    async fn test_database_refresh_store() {
        let db = Database::in_memory().await.unwrap();
        exercise_refresh_store(&DatabaseRefreshTokenStore::new(db)).await;
    }

    #[tokio::test]
    async fn test_memory_credential_store() {
        let store = MemoryCredentialStore::new();

        let alice = store.create(new_user("alice")).await.unwrap();
        assert_eq!(alice.id, 1);
        assert!(matches!(
            store.create(new_user("alice")).await,
            Err(DbError::Duplicate(_))
        ));
        assert_eq!(store.find("alice").await.unwrap().unwrap().id, 1);
        assert!(store.find("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_database_credential_store() {
        let db = Database::in_memory().await.unwrap();
        let store: &dyn CredentialStore = &db;

        store.create(new_user("alice")).await.unwrap();
        assert!(matches!(
            store.create(new_user("alice")).await,
            Err(DbError::Duplicate(_))
        ));
        assert!(store.find("alice").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_concurrent_refresh_store_updates() {
        let store = Arc::new(MemoryRefreshTokenStore::new());

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    let token = format!("token-{}", i);
                    store.insert(&token, "alice").await.unwrap();
                    if i % 2 == 0 {
                        store.remove(&token).await.unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.count().await.unwrap(), 16);
        assert!(store.contains("token-1").await.unwrap());
        assert!(!store.contains("token-2").await.unwrap());
    }

    #[test]
    fn test_refresh_store_kind_parse() {
        assert_eq!("memory".parse::<RefreshStoreKind>().unwrap(), RefreshStoreKind::Memory);
        assert_eq!("Database".parse::<RefreshStoreKind>().unwrap(), RefreshStoreKind::Database);
        assert!("redis".parse::<RefreshStoreKind>().is_err());
        assert_eq!(RefreshStoreKind::default().as_str(), "memory");
    }
}
