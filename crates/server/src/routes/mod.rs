//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                              - Liveness check
//! GET  /health/ready                        - Readiness check (pings the database)
//!
//! # Auth
//! POST /api/auth/register                   - Create an account, mail a verification link
//! POST /api/auth/request-otp                - Issue a sign-in code
//! POST /api/auth/verify-otp                 - Exchange a code for a bearer token
//! GET  /api/auth/verify-email?token=...     - Redeem a verification link
//! POST /api/auth/logout                     - Revoke the presented bearer token
//!
//! # Products (public)
//! GET  /api/products                        - Catalog listing (category / in_stock filters)
//! GET  /api/products/{id}                   - Product detail
//!
//! # Orders
//! POST /api/orders                          - Capture an order
//! GET  /api/orders/{number}                 - Order lookup by number
//!
//! # Admin (bearer token with admin role)
//! POST   /api/admin/products                - Create product
//! PUT    /api/admin/products/{id}           - Partial update
//! DELETE /api/admin/products/{id}           - Delete product
//! POST   /api/admin/products/upload-images  - Multipart image upload
//! GET    /api/admin/dashboard               - Counts, revenue, recent orders
//!
//! # Static
//! GET  /uploads/*                           - Uploaded product images
//! ```

pub mod admin;
pub mod auth;
pub mod orders;
pub mod products;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::middleware::rate_limit;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/request-otp", post(auth::request_otp))
        .route("/verify-otp", post(auth::verify_otp))
        .route("/verify-email", get(auth::verify_email))
        .route("/logout", post(auth::logout))
}

/// Create the public product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create))
        .route("/{number}", get(orders::show))
}

/// Assemble the full application router.
///
/// Sentry layers are added by the binary on top of this, so tests exercise
/// the same router without an error-tracking dependency.
pub fn app(state: AppState) -> Router {
    let upload_dir = state.config().upload_dir.clone();

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest(
            "/api/auth",
            auth_routes().layer(rate_limit::auth_rate_limiter()),
        )
        .nest("/api/products", product_routes())
        .nest(
            "/api/orders",
            order_routes().layer(rate_limit::api_rate_limiter()),
        )
        .nest("/api/admin", admin::routes())
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
