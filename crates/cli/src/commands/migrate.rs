//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! vf-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `SHOP_DATABASE_URL` - `SQLite` connection string (fallback: `DATABASE_URL`)

use tracing::info;

use velvet_fig_server::db::MIGRATOR;

/// Run the embedded schema migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    info!("Connecting to database...");
    let pool = super::connect().await?;

    info!("Running migrations...");
    MIGRATOR.run(&pool).await?;

    info!("Migrations complete!");
    Ok(())
}
