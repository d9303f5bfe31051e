//! Repository for one-time sign-in codes.
//!
//! Issuing never invalidates earlier codes for the same email, so several
//! live rows can coexist; expired and redeemed rows sit in the table until
//! the cleanup command removes them.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use velvet_fig_core::{Email, LoginCodeId};

use super::RepositoryError;
use crate::models::login_code::LoginCode;

#[derive(Debug, sqlx::FromRow)]
struct LoginCodeRow {
    id: i64,
    email: String,
    code: String,
    expires_at: DateTime<Utc>,
    used: bool,
    attempts: i64,
    created_at: DateTime<Utc>,
}

impl From<LoginCodeRow> for LoginCode {
    fn from(row: LoginCodeRow) -> Self {
        Self {
            id: LoginCodeId::new(row.id),
            email: row.email,
            code: row.code,
            expires_at: row.expires_at,
            used: row.used,
            attempts: row.attempts,
            created_at: row.created_at,
        }
    }
}

const LOGIN_CODE_COLUMNS: &str = "id, email, code, expires_at, used, attempts, created_at";

/// Repository for login code database operations.
pub struct LoginCodeRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> LoginCodeRepository<'a> {
    /// Create a new login code repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a fresh code for an email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        email: &Email,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<LoginCode, RepositoryError> {
        let row = sqlx::query_as::<_, LoginCodeRow>(&format!(
            "INSERT INTO login_codes (email, code, expires_at, used, attempts, created_at)
             VALUES (?1, ?2, ?3, 0, 0, ?4)
             RETURNING {LOGIN_CODE_COLUMNS}"
        ))
        .bind(email.as_str())
        .bind(code)
        .bind(expires_at)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Fetch the newest unredeemed, unexpired code for an email.
    ///
    /// Redeemed rows are excluded here, which is why verifying an
    /// already-used code surfaces as "no code found" rather than a
    /// distinct state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn latest_active(
        &self,
        email: &Email,
        now: DateTime<Utc>,
    ) -> Result<Option<LoginCode>, RepositoryError> {
        let row = sqlx::query_as::<_, LoginCodeRow>(&format!(
            "SELECT {LOGIN_CODE_COLUMNS} FROM login_codes
             WHERE email = ?1 AND used = 0 AND expires_at > ?2
             ORDER BY created_at DESC, id DESC
             LIMIT 1"
        ))
        .bind(email.as_str())
        .bind(now)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Record one mismatched submission against a code.
    ///
    /// The counter is stored for audit only; no threshold is checked
    /// anywhere.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the code row doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn record_attempt(&self, id: LoginCodeId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE login_codes SET attempts = attempts + 1 WHERE id = ?1")
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Mark a code as redeemed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the code row doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn mark_used(&self, id: LoginCodeId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE login_codes SET used = 1 WHERE id = ?1")
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Get a code row by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: LoginCodeId) -> Result<Option<LoginCode>, RepositoryError> {
        let row = sqlx::query_as::<_, LoginCodeRow>(&format!(
            "SELECT {LOGIN_CODE_COLUMNS} FROM login_codes WHERE id = ?1"
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Delete redeemed and expired rows. Maintenance only; the verify path
    /// never calls this.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_stale(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM login_codes WHERE used = 1 OR expires_at <= ?1")
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

    fn email() -> Email {
        Email::parse("shopper@example.com").unwrap()
    }

    #[tokio::test]
    async fn test_latest_active_prefers_newest() {
        let pool = test_pool().await;
        let repo = LoginCodeRepository::new(&pool);
        let expires = Utc::now() + chrono::Duration::minutes(10);

        repo.create(&email(), "111111", expires).await.unwrap();
        let second = repo.create(&email(), "222222", expires).await.unwrap();

        let latest = repo
            .latest_active(&email(), Utc::now())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.id, second.id);
        assert_eq!(latest.code, "222222");
    }

    #[tokio::test]
    async fn test_latest_active_skips_expired_and_used() {
        let pool = test_pool().await;
        let repo = LoginCodeRepository::new(&pool);

        let expired = Utc::now() - chrono::Duration::minutes(1);
        repo.create(&email(), "111111", expired).await.unwrap();

        let live = repo
            .create(&email(), "222222", Utc::now() + chrono::Duration::minutes(10))
            .await
            .unwrap();
        repo.mark_used(live.id).await.unwrap();

        assert!(
            repo.latest_active(&email(), Utc::now())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_record_attempt_increments() {
        let pool = test_pool().await;
        let repo = LoginCodeRepository::new(&pool);

        let code = repo
            .create(&email(), "333333", Utc::now() + chrono::Duration::minutes(10))
            .await
            .unwrap();
        assert_eq!(code.attempts, 0);

        repo.record_attempt(code.id).await.unwrap();
        let reloaded = repo.get(code.id).await.unwrap().unwrap();
        assert_eq!(reloaded.attempts, 1);
    }

    #[tokio::test]
    async fn test_delete_stale_keeps_live_codes() {
        let pool = test_pool().await;
        let repo = LoginCodeRepository::new(&pool);

        let expired = repo
            .create(&email(), "111111", Utc::now() - chrono::Duration::minutes(1))
            .await
            .unwrap();
        let used = repo
            .create(&email(), "222222", Utc::now() + chrono::Duration::minutes(10))
            .await
            .unwrap();
        repo.mark_used(used.id).await.unwrap();
        let live = repo
            .create(&email(), "333333", Utc::now() + chrono::Duration::minutes(10))
            .await
            .unwrap();

        let removed = repo.delete_stale(Utc::now()).await.unwrap();
        assert_eq!(removed, 2);

        assert!(repo.get(expired.id).await.unwrap().is_none());
        assert!(repo.get(live.id).await.unwrap().is_some());
    }
}
