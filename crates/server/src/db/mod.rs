//! Database operations for the embedded `SQLite` database.
//!
//! ## Tables
//!
//! - `users` - Shopper and staff accounts
//! - `login_codes` - One-time sign-in codes (stale rows accumulate until
//!   `vf-cli cleanup` runs)
//! - `email_verification_tokens` - Single-use account-verification links
//! - `auth_tokens` - Opaque bearer tokens (SHA-256 digests at rest)
//! - `products` - Catalog, including the legacy `image_url` column
//! - `orders` - Captured orders
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p velvet-fig-cli -- migrate
//! ```
//! They are intentionally not run at server startup.

pub mod auth_tokens;
pub mod email_tokens;
pub mod login_codes;
pub mod orders;
pub mod products;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

pub use auth_tokens::AuthTokenRepository;
pub use email_tokens::EmailTokenRepository;
pub use login_codes::LoginCodeRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Embedded schema migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `SQLite` connection pool with sensible defaults.
///
/// The database file is created if missing; WAL journaling keeps readers
/// from blocking the single writer.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url.expose_secret())?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// In-memory pool with migrations applied, for unit tests.
///
/// A single connection is required: every connection to `sqlite::memory:`
/// would otherwise get its own empty database.
#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    #[allow(clippy::unwrap_used)]
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    #[allow(clippy::unwrap_used)]
    MIGRATOR.run(&pool).await.unwrap();
    pool
}
