//! Admin dashboard route handler.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use velvet_fig_core::Price;

use crate::db::orders::OrderRepository;
use crate::db::products::ProductRepository;
use crate::db::users::UserRepository;
use crate::error::AppError;
use crate::middleware::auth::RequireAdmin;
use crate::models::order::Order;
use crate::state::AppState;

/// Dashboard metrics and recent activity.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub orders: i64,
    pub revenue: Price,
    pub products: i64,
    pub users: i64,
    pub recent_orders: Vec<Order>,
}

/// Dashboard overview.
///
/// GET /api/admin/dashboard
#[instrument(skip(admin, state))]
pub async fn dashboard(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, AppError> {
    tracing::debug!(admin = %admin.email, "Dashboard requested");

    let orders_repo = OrderRepository::new(state.pool());
    let products_repo = ProductRepository::new(state.pool());
    let users_repo = UserRepository::new(state.pool());

    // Fan the count queries out concurrently
    let (orders, revenue, products, users, recent_orders) = tokio::join!(
        orders_repo.count(),
        orders_repo.revenue(),
        products_repo.count(),
        users_repo.count(),
        orders_repo.recent(5),
    );

    Ok(Json(DashboardResponse {
        orders: orders?,
        revenue: revenue?,
        products: products?,
        users: users?,
        recent_orders: recent_orders?,
    }))
}
