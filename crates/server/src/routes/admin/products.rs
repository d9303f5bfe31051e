//! Admin product management route handlers.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use velvet_fig_core::{Price, ProductId};

use crate::db::products::ProductRepository;
use crate::error::AppError;
use crate::middleware::auth::RequireAdmin;
use crate::models::product::{NewProduct, Product, ProductUpdate};
use crate::state::AppState;

// =============================================================================
// Create
// =============================================================================

/// Product creation request.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    pub category: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    /// Defaults to in stock.
    pub in_stock: Option<bool>,
    pub sku: Option<String>,
}

/// Create a product.
///
/// POST /api/admin/products
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let name = req.name.trim().to_owned();
    if name.is_empty() {
        return Err(AppError::BadRequest("product name is required".to_owned()));
    }
    let category = req.category.trim().to_owned();
    if category.is_empty() {
        return Err(AppError::BadRequest("category is required".to_owned()));
    }

    let product = ProductRepository::new(state.pool())
        .create(&NewProduct {
            name,
            description: req.description,
            price: req.price,
            category,
            images: req.image_urls,
            in_stock: req.in_stock.unwrap_or(true),
            sku: req.sku,
        })
        .await?;

    tracing::info!(
        product_id = %product.id,
        admin = %admin.email,
        "Product created"
    );

    Ok((StatusCode::CREATED, Json(product)))
}

// =============================================================================
// Update
// =============================================================================

/// Partial product update request.
///
/// Only these fields can change; anything else in the body is rejected by
/// serde rather than silently written to the table.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub category: Option<String>,
    pub image_urls: Option<Vec<String>>,
    pub in_stock: Option<bool>,
    pub sku: Option<String>,
}

/// Apply a partial update to a product.
///
/// PUT /api/admin/products/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i64>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<Product>, AppError> {
    let update = ProductUpdate {
        name: req.name,
        description: req.description,
        price: req.price,
        category: req.category,
        images: req.image_urls,
        in_stock: req.in_stock,
        sku: req.sku,
    };

    if update.is_empty() {
        return Err(AppError::BadRequest("no fields to update".to_owned()));
    }

    let product = ProductRepository::new(state.pool())
        .update(ProductId::new(id), &update)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => AppError::NotFound(format!("product {id}")),
            other => other.into(),
        })?;

    tracing::info!(
        product_id = %product.id,
        admin = %admin.email,
        "Product updated"
    );

    Ok(Json(product))
}

// =============================================================================
// Delete
// =============================================================================

/// Response after deleting a product.
#[derive(Debug, Serialize)]
pub struct DeleteProductResponse {
    pub success: bool,
}

/// Delete a product.
///
/// DELETE /api/admin/products/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i64>,
) -> Result<Json<DeleteProductResponse>, AppError> {
    let deleted = ProductRepository::new(state.pool())
        .delete(ProductId::new(id))
        .await?;

    if !deleted {
        return Err(AppError::NotFound(format!("product {id}")));
    }

    tracing::info!(product_id = %id, admin = %admin.email, "Product deleted");

    Ok(Json(DeleteProductResponse { success: true }))
}

// =============================================================================
// Image upload
// =============================================================================

/// Response after uploading images.
#[derive(Debug, Serialize)]
pub struct UploadImagesResponse {
    pub urls: Vec<String>,
}

/// Store uploaded product images and return their public URLs.
///
/// POST /api/admin/products/upload-images
pub async fn upload_images(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    mut multipart: Multipart,
) -> Result<Json<UploadImagesResponse>, AppError> {
    let urls = state.uploads().save_images(&mut multipart).await?;

    tracing::info!(count = urls.len(), admin = %admin.email, "Images uploaded");

    Ok(Json(UploadImagesResponse { urls }))
}
