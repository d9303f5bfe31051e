//! Order domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use velvet_fig_core::{Email, OrderId, Price};

/// A captured order (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Human-facing order number (unique).
    pub order_number: String,
    /// Customer email address.
    pub customer_email: Email,
    /// Customer display name.
    pub customer_name: String,
    /// Order total.
    pub total: Price,
    /// Fulfillment status. Free text with no enumerated transition table;
    /// new orders start as "pending".
    pub status: String,
    /// When the order was captured.
    pub created_at: DateTime<Utc>,
    /// When the order was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Parameters for capturing an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Human-facing order number (unique).
    pub order_number: String,
    /// Customer email address.
    pub customer_email: Email,
    /// Customer display name.
    pub customer_name: String,
    /// Order total.
    pub total: Price,
}
