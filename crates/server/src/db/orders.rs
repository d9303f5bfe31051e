//! Order repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use velvet_fig_core::{Email, OrderId, Price};

use super::RepositoryError;
use crate::models::order::{NewOrder, Order};

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    order_number: String,
    customer_email: String,
    customer_name: String,
    total: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> Result<Order, RepositoryError> {
        let customer_email = Email::parse(&self.customer_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let total = Price::parse(&self.total).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid total in database: {e}"))
        })?;

        Ok(Order {
            id: OrderId::new(self.id),
            order_number: self.order_number,
            customer_email,
            customer_name: self.customer_name,
            total,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const ORDER_COLUMNS: &str =
    "id, order_number, customer_email, customer_name, total, status, created_at, updated_at";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Capture a new order with status `pending`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order number already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new: &NewOrder) -> Result<Order, RepositoryError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders (order_number, customer_email, customer_name, total, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, 'pending', ?5, ?5)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(&new.order_number)
        .bind(new.customer_email.as_str())
        .bind(&new.customer_name)
        .bind(new.total.to_string())
        .bind(now)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("order number already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.into_order()
    }

    /// Get an order by its human-facing number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_by_number(&self, number: &str) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_number = ?1"
        ))
        .bind(number)
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_order).transpose()
    }

    /// The most recently captured orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn recent(&self, limit: i64) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, id DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_order).collect()
    }

    /// Count all orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Sum of all order totals.
    ///
    /// Totals are decimal text, so the sum happens here rather than in SQL;
    /// rows with unparseable totals are skipped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn revenue(&self) -> Result<Price, RepositoryError> {
        let totals: Vec<String> = sqlx::query_scalar("SELECT total FROM orders")
            .fetch_all(self.pool)
            .await?;

        Ok(totals
            .iter()
            .filter_map(|t| Price::parse(t).ok())
            .fold(Price::zero(), |acc, p| acc + p))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn order(number: &str, total: &str) -> NewOrder {
        NewOrder {
            order_number: number.to_owned(),
            customer_email: Email::parse("shopper@example.com").unwrap(),
            customer_name: "Nia Shopper".to_owned(),
            total: Price::parse(total).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_create_then_get_by_number() {
        let pool = test_pool().await;
        let repo = OrderRepository::new(&pool);

        let created = repo.create(&order("VF-1001", "120.00")).await.unwrap();
        assert_eq!(created.status, "pending");

        let fetched = repo.get_by_number("VF-1001").await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.total, Price::parse("120.00").unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_order_number_conflicts() {
        let pool = test_pool().await;
        let repo = OrderRepository::new(&pool);

        repo.create(&order("VF-2001", "10.00")).await.unwrap();
        let err = repo.create(&order("VF-2001", "20.00")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_count_and_revenue() {
        let pool = test_pool().await;
        let repo = OrderRepository::new(&pool);

        repo.create(&order("VF-3001", "10.50")).await.unwrap();
        repo.create(&order("VF-3002", "20.00")).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 2);
        assert_eq!(repo.revenue().await.unwrap(), Price::parse("30.50").unwrap());
    }

    #[tokio::test]
    async fn test_recent_orders_newest_first() {
        let pool = test_pool().await;
        let repo = OrderRepository::new(&pool);

        repo.create(&order("VF-4001", "1.00")).await.unwrap();
        repo.create(&order("VF-4002", "2.00")).await.unwrap();
        repo.create(&order("VF-4003", "3.00")).await.unwrap();

        let recent = repo.recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent.first().unwrap().order_number, "VF-4003");
    }
}
