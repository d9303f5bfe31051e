//! Product repository for database operations.
//!
//! The `products` table carries two image columns: the legacy single
//! `image_url` and the JSON-array `image_urls` that superseded it. Writes
//! only ever touch `image_urls`; reads fall back to the legacy column for
//! rows the backfill has not reached, so a half-migrated database stays
//! serviceable.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use velvet_fig_core::{Price, ProductId};

use super::RepositoryError;
use crate::models::product::{NewProduct, Product, ProductUpdate};

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: String,
    price: String,
    category: String,
    image_url: Option<String>,
    image_urls: Option<String>,
    in_stock: bool,
    sku: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self) -> Result<Product, RepositoryError> {
        let price = Price::parse(&self.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price in database: {e}"))
        })?;

        // Prefer the JSON column; fall back to the legacy single URL.
        let images = match self.image_urls {
            Some(json) => serde_json::from_str::<Vec<String>>(&json).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid image_urls in database: {e}"))
            })?,
            None => self
                .image_url
                .filter(|url| !url.is_empty())
                .map(|url| vec![url])
                .unwrap_or_default(),
        };

        Ok(Product {
            id: ProductId::new(self.id),
            name: self.name,
            description: self.description,
            price,
            category: self.category,
            images,
            in_stock: self.in_stock,
            sku: self.sku,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const PRODUCT_COLUMNS: &str = "id, name, description, price, category, image_url, image_urls, in_stock, sku, created_at, updated_at";

/// Filters for product listing.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Only products in this category.
    pub category: Option<String>,
    /// Only products matching this stock flag.
    pub in_stock: Option<bool>,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: &NewProduct) -> Result<Product, RepositoryError> {
        let images = serde_json::to_string(&new.images).map_err(|e| {
            RepositoryError::DataCorruption(format!("failed to serialize image urls: {e}"))
        })?;
        let now = Utc::now();

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO products (name, description, price, category, image_urls, in_stock, sku, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price.to_string())
        .bind(&new.category)
        .bind(images)
        .bind(new.in_stock)
        .bind(new.sku.as_deref())
        .bind(now)
        .fetch_one(self.pool)
        .await?;

        row.into_product()
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(ProductRow::into_product).transpose()
    }

    /// List products, newest first, optionally filtered.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let mut query: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE 1 = 1"));

        if let Some(category) = &filter.category {
            query.push(" AND category = ");
            query.push_bind(category);
        }
        if let Some(in_stock) = filter.in_stock {
            query.push(" AND in_stock = ");
            query.push_bind(in_stock);
        }
        query.push(" ORDER BY created_at DESC, id DESC");

        let rows: Vec<ProductRow> = query.build_query_as().fetch_all(self.pool).await?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    /// Apply a partial update and return the updated product.
    ///
    /// Only the fields enumerated on `ProductUpdate` can change; unset
    /// fields keep their stored values.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, RepositoryError> {
        let images = update
            .images
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("failed to serialize image urls: {e}"))
            })?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products SET
                 name = COALESCE(?1, name),
                 description = COALESCE(?2, description),
                 price = COALESCE(?3, price),
                 category = COALESCE(?4, category),
                 image_urls = COALESCE(?5, image_urls),
                 in_stock = COALESCE(?6, in_stock),
                 sku = COALESCE(?7, sku),
                 updated_at = ?8
             WHERE id = ?9
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(update.name.as_deref())
        .bind(update.description.as_deref())
        .bind(update.price.map(|p| p.to_string()))
        .bind(update.category.as_deref())
        .bind(images)
        .bind(update.in_stock)
        .bind(update.sku.as_deref())
        .bind(Utc::now())
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.into_product()
    }

    /// Delete a product.
    ///
    /// # Returns
    ///
    /// Returns `true` if the product was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count all products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
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

    fn silk_dress() -> NewProduct {
        NewProduct {
            name: "Silk Wrap Dress".to_owned(),
            description: "Bias-cut midi in washed silk.".to_owned(),
            price: Price::parse("189.00").unwrap(),
            category: "dresses".to_owned(),
            images: vec!["https://cdn.velvetfig.shop/silk-wrap-front.jpg".to_owned()],
            in_stock: true,
            sku: Some("VF-DR-001".to_owned()),
        }
    }

    #[tokio::test]
    async fn test_create_then_get_returns_identical_fields() {
        let pool = test_pool().await;
        let repo = ProductRepository::new(&pool);

        let created = repo.create(&silk_dress()).await.unwrap();
        let fetched = repo.get(created.id).await.unwrap().unwrap();

        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_delete_then_get_returns_none() {
        let pool = test_pool().await;
        let repo = ProductRepository::new(&pool);

        let created = repo.create(&silk_dress()).await.unwrap();
        assert!(repo.delete(created.id).await.unwrap());
        assert!(repo.get(created.id).await.unwrap().is_none());

        // Deleting again reports nothing removed
        assert!(!repo.delete(created.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_partial_update_keeps_unset_fields() {
        let pool = test_pool().await;
        let repo = ProductRepository::new(&pool);

        let created = repo.create(&silk_dress()).await.unwrap();
        let updated = repo
            .update(
                created.id,
                &ProductUpdate {
                    price: Some(Price::parse("149.00").unwrap()),
                    in_stock: Some(false),
                    ..ProductUpdate::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.price, Price::parse("149.00").unwrap());
        assert!(!updated.in_stock);
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.images, created.images);
        assert_eq!(updated.sku, created.sku);
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let pool = test_pool().await;
        let repo = ProductRepository::new(&pool);

        let err = repo
            .update(ProductId::new(999), &ProductUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_list_filters() {
        let pool = test_pool().await;
        let repo = ProductRepository::new(&pool);

        repo.create(&silk_dress()).await.unwrap();
        let mut coat = silk_dress();
        coat.name = "Wool Trench".to_owned();
        coat.category = "outerwear".to_owned();
        coat.in_stock = false;
        repo.create(&coat).await.unwrap();

        let all = repo.list(&ProductFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let dresses = repo
            .list(&ProductFilter {
                category: Some("dresses".to_owned()),
                in_stock: None,
            })
            .await
            .unwrap();
        assert_eq!(dresses.len(), 1);
        assert_eq!(dresses.first().unwrap().name, "Silk Wrap Dress");

        let in_stock = repo
            .list(&ProductFilter {
                category: None,
                in_stock: Some(true),
            })
            .await
            .unwrap();
        assert_eq!(in_stock.len(), 1);
    }

    #[tokio::test]
    async fn test_legacy_image_url_fallback() {
        let pool = test_pool().await;
        let repo = ProductRepository::new(&pool);

        // A row from before the image_urls column was backfilled
        sqlx::query(
            "INSERT INTO products (name, description, price, category, image_url, in_stock, created_at, updated_at)
             VALUES ('Archive Scarf', '', '39.00', 'accessories', 'https://x/a.jpg', 1, ?1, ?1)",
        )
        .bind(Utc::now())
        .execute(&pool)
        .await
        .unwrap();

        let products = repo.list(&ProductFilter::default()).await.unwrap();
        let scarf = products.iter().find(|p| p.name == "Archive Scarf").unwrap();
        assert_eq!(scarf.images, vec!["https://x/a.jpg".to_owned()]);
    }
}
