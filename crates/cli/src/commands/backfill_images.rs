//! One-shot backfill of `products.image_urls` from the legacy `image_url`
//! column.
//!
//! Older databases stored a single image URL per product; the current schema
//! keeps a JSON-encoded array in `image_urls`. This command patches such a
//! database in place:
//!
//! 1. add the `image_urls` column if it does not exist yet,
//! 2. for every row with a non-empty legacy `image_url` and no `image_urls`
//!    value, write `image_urls = [image_url]`.
//!
//! The legacy column is left untouched; dropping it safely would need an
//! audit of every environment that ever ran the old schema. There is no
//! transaction around the row scan: a crash midway leaves a partially
//! migrated table, and re-running picks up where things stopped. Both the
//! column check and the `image_urls IS NULL` predicate make a second run a
//! no-op.

use thiserror::Error;
use tracing::info;

/// Errors that can occur during the backfill.
#[derive(Debug, Error)]
pub enum BackfillError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Legacy URL could not be encoded as JSON.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// What a backfill run did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BackfillSummary {
    /// Whether the `image_urls` column had to be added.
    pub column_added: bool,
    /// How many rows received a backfilled `image_urls` value.
    pub rows_migrated: u64,
}

/// Entry point for `vf-cli backfill-images`.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a statement fails;
/// the process then exits non-zero. No retry, no rollback.
pub async fn execute() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;
    let summary = run(&pool).await?;

    info!(
        column_added = summary.column_added,
        rows_migrated = summary.rows_migrated,
        "Image backfill complete"
    );
    Ok(())
}

/// Run the backfill against a pool.
///
/// # Errors
///
/// Returns `BackfillError` if a statement fails mid-scan; already-migrated
/// rows stay migrated.
pub async fn run(pool: &sqlx::SqlitePool) -> Result<BackfillSummary, BackfillError> {
    let mut summary = BackfillSummary::default();

    // Column-existence check is the only idempotence guard the ALTER needs
    let column_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM pragma_table_info('products') WHERE name = 'image_urls'",
    )
    .fetch_one(pool)
    .await?;

    if column_count == 0 {
        sqlx::query("ALTER TABLE products ADD COLUMN image_urls TEXT")
            .execute(pool)
            .await?;
        summary.column_added = true;
        info!("Added image_urls column to products");
    }

    let rows: Vec<(i64, String)> = sqlx::query_as(
        "SELECT id, image_url FROM products
         WHERE image_url IS NOT NULL AND image_url != ''
           AND (image_urls IS NULL OR image_urls = '')",
    )
    .fetch_all(pool)
    .await?;

    for (id, legacy_url) in rows {
        let encoded = serde_json::to_string(&vec![legacy_url])?;
        sqlx::query("UPDATE products SET image_urls = ?1 WHERE id = ?2")
            .bind(&encoded)
            .bind(id)
            .execute(pool)
            .await?;
        summary.rows_migrated += 1;
    }

    Ok(summary)
}
