//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use velvet_fig_core::{Email, UserId, UserRole};

use super::RepositoryError;
use crate::models::user::{NewUser, User};

/// Raw `users` row, decoded before domain validation.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserRow {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    /// Parse the row into a domain `User`.
    pub(crate) fn into_user(self) -> Result<User, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role: UserRole = self
            .role
            .parse()
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid role in database: {e}")))?;

        Ok(User {
            id: UserId::new(self.id),
            email,
            first_name: self.first_name,
            last_name: self.last_name,
            role,
            email_verified: self.email_verified,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Columns selected for every user read; keeps the password hash out of
/// domain objects.
pub(crate) const USER_COLUMNS: &str =
    "id, email, first_name, last_name, role, email_verified, created_at, updated_at";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?1"
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new: &NewUser) -> Result<User, RepositoryError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (email, first_name, last_name, password_hash, role, email_verified, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?6)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(new.email.as_str())
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(new.password_hash.as_deref())
        .bind(new.role.to_string())
        .bind(now)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.into_user()
    }

    /// Mark a user's email as verified.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has that email.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn mark_verified(&self, email: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET email_verified = 1, updated_at = ?1 WHERE email = ?2",
        )
        .bind(Utc::now())
        .bind(email)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Change a user's role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has that email.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_role(&self, email: &Email, role: UserRole) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET role = ?1, updated_at = ?2 WHERE email = ?3")
            .bind(role.to_string())
            .bind(Utc::now())
            .bind(email.as_str())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Count all users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: Email::parse(email).unwrap(),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            password_hash: None,
            role: UserRole::User,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_roundtrip() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);

        let created = repo.create(&new_user("ada@example.com")).await.unwrap();
        assert_eq!(created.first_name, "Ada");
        assert!(!created.email_verified);

        let by_email = repo
            .get_by_email(&Email::parse("ada@example.com").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, created.id);

        let by_id = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_id.email.as_str(), "ada@example.com");
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);

        repo.create(&new_user("dup@example.com")).await.unwrap();
        let err = repo.create(&new_user("dup@example.com")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_mark_verified() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);

        let user = repo.create(&new_user("v@example.com")).await.unwrap();
        repo.mark_verified("v@example.com").await.unwrap();

        let reloaded = repo.get_by_id(user.id).await.unwrap().unwrap();
        assert!(reloaded.email_verified);
    }

    #[tokio::test]
    async fn test_mark_verified_missing_user() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);

        let err = repo.mark_verified("ghost@example.com").await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_set_role() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);

        let email = Email::parse("staff@example.com").unwrap();
        repo.create(&new_user("staff@example.com")).await.unwrap();
        repo.set_role(&email, UserRole::Admin).await.unwrap();

        let reloaded = repo.get_by_email(&email).await.unwrap().unwrap();
        assert_eq!(reloaded.role, UserRole::Admin);
    }

    #[tokio::test]
    async fn test_count() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);

        assert_eq!(repo.count().await.unwrap(), 0);
        repo.create(&new_user("one@example.com")).await.unwrap();
        repo.create(&new_user("two@example.com")).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 2);
    }
}
