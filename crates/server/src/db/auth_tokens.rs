//! Repository for opaque bearer tokens.
//!
//! Only the SHA-256 digest of a token is persisted; the raw value exists
//! solely in the response that minted it.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;

use velvet_fig_core::UserId;

use super::users::{USER_COLUMNS, UserRow};
use super::RepositoryError;
use crate::models::user::User;

/// Hex-encoded SHA-256 digest of a raw token.
#[must_use]
pub fn hash_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

/// Repository for bearer token database operations.
pub struct AuthTokenRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AuthTokenRepository<'a> {
    /// Create a new auth token repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a token digest for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        user_id: UserId,
        raw_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO auth_tokens (token_hash, user_id, expires_at, created_at)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(hash_token(raw_token))
        .bind(user_id.as_i64())
        .bind(expires_at)
        .bind(Utc::now())
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Resolve a presented token to its user, if the token is live.
    ///
    /// The token is trusted until it expires or is deleted; nothing here
    /// re-checks the sign-in code that minted it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored user data is invalid.
    pub async fn authenticate(
        &self,
        raw_token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE id = (
                 SELECT user_id FROM auth_tokens
                 WHERE token_hash = ?1 AND expires_at > ?2
             )"
        ))
        .bind(hash_token(raw_token))
        .bind(now)
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Delete a token (logout). Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, raw_token: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE token_hash = ?1")
            .bind(hash_token(raw_token))
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete expired tokens. Maintenance only.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE expires_at <= ?1")
            .bind(now)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::db::users::UserRepository;
    use crate::models::user::NewUser;
    use velvet_fig_core::{Email, UserRole};

    async fn seeded_user(pool: &SqlitePool) -> User {
        UserRepository::new(pool)
            .create(&NewUser {
                email: Email::parse("t@example.com").unwrap(),
                first_name: "Tess".to_owned(),
                last_name: "Okonkwo".to_owned(),
                password_hash: None,
                role: UserRole::User,
            })
            .await
            .unwrap()
    }

    #[test]
    fn test_hash_token_is_stable_hex() {
        let digest = hash_token("abc");
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, hash_token("abc"));
        assert_ne!(digest, hash_token("abd"));
    }

    #[tokio::test]
    async fn test_authenticate_roundtrip() {
        let pool = test_pool().await;
        let user = seeded_user(&pool).await;
        let repo = AuthTokenRepository::new(&pool);

        repo.create(user.id, "raw-token", Utc::now() + chrono::Duration::days(30))
            .await
            .unwrap();

        let resolved = repo
            .authenticate("raw-token", Utc::now())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.id, user.id);

        assert!(
            repo.authenticate("wrong-token", Utc::now())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let pool = test_pool().await;
        let user = seeded_user(&pool).await;
        let repo = AuthTokenRepository::new(&pool);

        repo.create(user.id, "old-token", Utc::now() - chrono::Duration::days(1))
            .await
            .unwrap();

        assert!(
            repo.authenticate("old-token", Utc::now())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_delete_revokes() {
        let pool = test_pool().await;
        let user = seeded_user(&pool).await;
        let repo = AuthTokenRepository::new(&pool);

        repo.create(user.id, "session", Utc::now() + chrono::Duration::days(30))
            .await
            .unwrap();

        assert!(repo.delete("session").await.unwrap());
        assert!(!repo.delete("session").await.unwrap());
        assert!(
            repo.authenticate("session", Utc::now())
                .await
                .unwrap()
                .is_none()
        );
    }
}
