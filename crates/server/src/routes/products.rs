//! Public product catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use velvet_fig_core::ProductId;

use crate::db::products::{ProductFilter, ProductRepository};
use crate::error::AppError;
use crate::models::product::Product;
use crate::state::AppState;

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub category: Option<String>,
    pub in_stock: Option<bool>,
}

/// Listing response.
#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    pub products: Vec<Product>,
}

/// Catalog listing, newest first.
///
/// GET /api/products
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> Result<Json<ProductsResponse>, AppError> {
    let products = ProductRepository::new(state.pool())
        .list(&ProductFilter {
            category: query.category,
            in_stock: query.in_stock,
        })
        .await?;

    Ok(Json(ProductsResponse { products }))
}

/// Product detail.
///
/// GET /api/products/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Product>, AppError> {
    let product = ProductRepository::new(state.pool())
        .get(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(Json(product))
}
