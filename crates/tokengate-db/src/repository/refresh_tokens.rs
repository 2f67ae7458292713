//! Outstanding refresh token operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::utils::token_digest;

use super::Database;

impl Database {
    /// Record a refresh token as outstanding
    ///
    /// Re-inserting a token that is already present is a no-op.
    pub async fn insert_refresh_token(&self, token: &str, name: &str) -> Result<(), DbError> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (token_hash, name, issued_at)
            VALUES (?, ?, ?)
            ON CONFLICT(token_hash) DO NOTHING
            "#,
        )
        .bind(token_digest(token))
        .bind(name)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Check whether a refresh token is outstanding
    pub async fn refresh_token_exists(&self, token: &str) -> Result<bool, DbError> {
        let result = sqlx::query("SELECT 1 FROM refresh_tokens WHERE token_hash = ?")
            .bind(token_digest(token))
            .fetch_optional(&self.pool)
            .await?;
        Ok(result.is_some())
    }

    /// Remove a refresh token; returns whether it was present
    pub async fn delete_refresh_token(&self, token: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE token_hash = ?")
            .bind(token_digest(token))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count outstanding refresh tokens
    pub async fn count_refresh_tokens(&self) -> Result<i64, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM refresh_tokens")
            .fetch_one(&self.pool)
            .await?;
        Ok(result.get("count"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_refresh_token_lifecycle() {
        let db = Database::in_memory().await.unwrap();

        assert!(!db.refresh_token_exists("tok-1").await.unwrap());

        db.insert_refresh_token("tok-1", "alice").await.unwrap();
        assert!(db.refresh_token_exists("tok-1").await.unwrap());
        assert!(!db.refresh_token_exists("tok-2").await.unwrap());

        assert_eq!(db.count_refresh_tokens().await.unwrap(), 1);

        assert!(db.delete_refresh_token("tok-1").await.unwrap());
        assert!(!db.refresh_token_exists("tok-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let db = Database::in_memory().await.unwrap();

        db.insert_refresh_token("tok", "alice").await.unwrap();
        assert!(db.delete_refresh_token("tok").await.unwrap());
        assert!(!db.delete_refresh_token("tok").await.unwrap());
        assert!(!db.delete_refresh_token("never-issued").await.unwrap());
        assert_eq!(db.count_refresh_tokens().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_noop() {
        let db = Database::in_memory().await.unwrap();

        db.insert_refresh_token("tok", "alice").await.unwrap();
        db.insert_refresh_token("tok", "alice").await.unwrap();
        assert_eq!(db.count_refresh_tokens().await.unwrap(), 1);
    }
}
