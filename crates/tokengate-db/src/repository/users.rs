//! User operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{NewUser, User};
use crate::repository::Database;

impl Database {
    // ==================== User Operations ====================

    /// Insert a new user
    ///
    /// Fails with [`DbError::Duplicate`] if the name is taken, including when
    /// a concurrent insert wins the race on the UNIQUE constraint.
    pub async fn insert_user(&self, user: NewUser) -> Result<User, DbError> {
        let now = Utc::now();

        if self.get_user_by_name(&user.name).await?.is_some() {
            return Err(DbError::Duplicate(format!("User '{}' already exists", user.name)));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO users (name, password_hash, created_at)
            VALUES (?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from)
        .map_err(|e| {
            if e.is_unique_violation() {
                DbError::Duplicate(format!("User '{}' already exists", user.name))
            } else {
                e
            }
        })?;

        let id: i64 = result.get("id");

        Ok(User {
            id,
            name: user.name,
            password_hash: user.password_hash,
            created_at: now,
        })
    }

    /// Get a user by name
    pub async fn get_user_by_name(&self, name: &str) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, name, password_hash, created_at
            FROM users
            WHERE name = ?
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            password_hash: format!("hash-of-{}", name),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_user() {
        let db = Database::in_memory().await.unwrap();

        let created = db.insert_user(new_user("alice")).await.unwrap();
        assert_eq!(created.name, "alice");

        let found = db.get_user_by_name("alice").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.password_hash, "hash-of-alice");
    }

    #[tokio::test]
    async fn test_missing_user() {
        let db = Database::in_memory().await.unwrap();
        assert!(db.get_user_by_name("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_user_rejected() {
        let db = Database::in_memory().await.unwrap();

        db.insert_user(new_user("alice")).await.unwrap();
        let err = db.insert_user(new_user("alice")).await.unwrap_err();

        assert!(matches!(err, DbError::Duplicate(_)));
        let stored = db.get_user_by_name("alice").await.unwrap().unwrap();
        assert_eq!(stored.password_hash, "hash-of-alice");
    }
}
