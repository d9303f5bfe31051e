//! Order capture route handlers.
//!
//! The cart itself is client-held state; the server only sees the captured
//! order.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Deserialize;

use velvet_fig_core::{Email, Price};

use crate::db::RepositoryError;
use crate::db::orders::OrderRepository;
use crate::error::AppError;
use crate::models::order::{NewOrder, Order};
use crate::state::AppState;

/// How many times a colliding order number is regenerated before giving up.
const ORDER_NUMBER_RETRIES: u32 = 5;

/// Order capture request.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_email: String,
    pub customer_name: String,
    pub total: Price,
}

/// Capture an order.
///
/// The order number is server-generated and unique; status starts as
/// `pending`.
///
/// POST /api/orders
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let customer_email = Email::parse(req.customer_email.trim())
        .map_err(|e| AppError::BadRequest(format!("invalid customer email: {e}")))?;

    let customer_name = req.customer_name.trim().to_owned();
    if customer_name.is_empty() {
        return Err(AppError::BadRequest("customer name is required".to_owned()));
    }

    let repo = OrderRepository::new(state.pool());

    // Regenerate on the (unlikely) chance two captures draw the same suffix
    let mut last_err = None;
    for _ in 0..ORDER_NUMBER_RETRIES {
        let result = repo
            .create(&NewOrder {
                order_number: generate_order_number(),
                customer_email: customer_email.clone(),
                customer_name: customer_name.clone(),
                total: req.total,
            })
            .await;

        match result {
            Ok(order) => {
                tracing::info!(order_number = %order.order_number, "Order captured");
                return Ok((StatusCode::CREATED, Json(order)));
            }
            Err(RepositoryError::Conflict(_)) => {
                last_err = Some(RepositoryError::Conflict("order number collision".to_owned()));
            }
            Err(other) => return Err(other.into()),
        }
    }

    Err(last_err
        .map_or_else(|| AppError::Internal("order capture failed".to_owned()), Into::into))
}

/// Order lookup by number.
///
/// GET /api/orders/{number}
pub async fn show(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<Order>, AppError> {
    let order = OrderRepository::new(state.pool())
        .get_by_number(&number)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {number}")))?;

    Ok(Json(order))
}

/// Generate a human-facing order number, e.g. `VF-20260807-4821`.
fn generate_order_number() -> String {
    use rand::Rng;
    let suffix: u32 = rand::rng().random_range(1000..10_000);
    format!("VF-{}-{suffix}", Utc::now().format("%Y%m%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_number_shape() {
        let number = generate_order_number();
        let mut parts = number.split('-');
        assert_eq!(parts.next(), Some("VF"));

        let date = parts.next().expect("date segment");
        assert_eq!(date.len(), 8);
        assert!(date.chars().all(|c| c.is_ascii_digit()));

        let suffix = parts.next().expect("suffix segment");
        assert_eq!(suffix.len(), 4);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));

        assert_eq!(parts.next(), None);
    }
}
