//! Repository for single-use email verification tokens.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use velvet_fig_core::Email;

use super::RepositoryError;

/// Repository for email verification token operations.
pub struct EmailTokenRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> EmailTokenRepository<'a> {
    /// Create a new email token repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a verification token for an email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the token value collides.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        email: &Email,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO email_verification_tokens (token, email, expires_at, used, created_at)
             VALUES (?1, ?2, ?3, 0, ?4)",
        )
        .bind(token)
        .bind(email.as_str())
        .bind(expires_at)
        .bind(Utc::now())
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("token already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(())
    }

    /// Redeem a token, returning the email it was issued for.
    ///
    /// Single statement: the token is only marked used if it is currently
    /// unused and unexpired, so a second redemption returns `None`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn consume(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, RepositoryError> {
        let email: Option<String> = sqlx::query_scalar(
            "UPDATE email_verification_tokens
             SET used = 1
             WHERE token = ?1 AND used = 0 AND expires_at > ?2
             RETURNING email",
        )
        .bind(token)
        .bind(now)
        .fetch_optional(self.pool)
        .await?;

        Ok(email)
    }

    /// Delete redeemed and expired tokens. Maintenance only.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_stale(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM email_verification_tokens WHERE used = 1 OR expires_at <= ?1",
        )
        .bind(now)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
