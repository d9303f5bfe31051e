//! Product domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use velvet_fig_core::{Price, ProductId};

/// A catalog product (domain type).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Long-form description.
    pub description: String,
    /// Unit price.
    pub price: Price,
    /// Merchandising category (e.g., "dresses", "outerwear").
    pub category: String,
    /// Image URLs, newest-schema representation. For rows that predate the
    /// `image_urls` column this is the legacy single `image_url` wrapped in
    /// a one-element list.
    pub images: Vec<String>,
    /// Whether the product is currently purchasable.
    pub in_stock: bool,
    /// Stock keeping unit, when assigned.
    pub sku: Option<String>,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    /// Display name.
    pub name: String,
    /// Long-form description.
    pub description: String,
    /// Unit price.
    pub price: Price,
    /// Merchandising category.
    pub category: String,
    /// Image URLs.
    pub images: Vec<String>,
    /// Whether the product is currently purchasable.
    pub in_stock: bool,
    /// Stock keeping unit.
    pub sku: Option<String>,
}

/// Partial update for a product.
///
/// Every updatable column is enumerated here; a `None` field leaves the
/// stored value untouched. There is deliberately no generic key/value
/// update path.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New unit price.
    pub price: Option<Price>,
    /// New category.
    pub category: Option<String>,
    /// Replacement image URL list.
    pub images: Option<Vec<String>>,
    /// New stock flag.
    pub in_stock: Option<bool>,
    /// New SKU.
    pub sku: Option<String>,
}

impl ProductUpdate {
    /// Whether the update carries no field changes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.images.is_none()
            && self.in_stock.is_none()
            && self.sku.is_none()
    }
}
