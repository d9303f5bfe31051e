//! Admin route handlers.
//!
//! Every handler here requires a bearer token that resolves to a user with
//! the admin role.

pub mod dashboard;
pub mod products;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    routing::{get, post, put},
};

use crate::services::uploads::MAX_UPLOAD_BYTES;
use crate::state::AppState;

/// Create the admin routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard::dashboard))
        .route("/products", post(products::create))
        .route(
            "/products/{id}",
            put(products::update).delete(products::delete),
        )
        .route(
            "/products/upload-images",
            post(products::upload_images).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
}
