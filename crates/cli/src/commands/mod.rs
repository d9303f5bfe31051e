//! CLI subcommands.

pub mod admin;
pub mod backfill_images;
pub mod cleanup;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::SqlitePool;

/// Resolve the database URL from the environment.
///
/// Loads `.env` if present, then reads `SHOP_DATABASE_URL` with a fallback
/// to the generic `DATABASE_URL`.
fn database_url() -> Result<SecretString, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    if let Ok(value) = std::env::var("SHOP_DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err("SHOP_DATABASE_URL not set".into())
}

/// Connect to the env-configured database.
pub(crate) async fn connect() -> Result<SqlitePool, Box<dyn std::error::Error>> {
    let url = database_url()?;
    let pool = velvet_fig_server::db::create_pool(&url).await?;
    Ok(pool)
}
