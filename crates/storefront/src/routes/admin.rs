//! Admin console route handlers.
//!
//! Every handler requires the admin role.

use axum::extract::State;
use serde::Deserialize;
use tracing::instrument;

use shopfront_core::OrderId;

use super::orders::{OrderListQuery, parse_status};
use super::products::{ListQuery, list_products};
use crate::db::{OrderRepository, RepositoryError};
use crate::error::{AppError, Json, Path, Query, Result};
use crate::middleware::RequireAdmin;
use crate::models::{Order, OrderPage, ProductPage};
use crate::state::AppState;

/// Default page size of the admin product table.
const DEFAULT_PRODUCT_LIMIT: u32 = 10;

/// Status change body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusRequest {
    pub status: Option<String>,
}

/// Catalog listing for the console.
///
/// GET /api/admin/products
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn products(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<ListQuery>,
) -> Result<Json<ProductPage>> {
    list_products(&state, query, DEFAULT_PRODUCT_LIMIT)
        .await
        .map(Json)
}

/// Every user's orders, newest first.
///
/// GET /api/admin/orders
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<OrderPage>> {
    let (status, page) = query.into_parts()?;
    let (orders, total) = OrderRepository::new(state.pool())
        .list(None, status, page)
        .await?;
    Ok(Json(OrderPage::new(orders, total, page)))
}

/// Write an order's status.
///
/// PUT /api/admin/orders/{order_id}/status
#[instrument(skip(state, admin, req), fields(admin_id = %admin.id))]
pub async fn set_order_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(order_id): Path<OrderId>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<Order>> {
    let status = parse_status(req.status.as_deref())?
        .ok_or_else(|| AppError::BadRequest("Status is required".to_string()))?;

    let order = OrderRepository::new(state.pool())
        .set_status(order_id, status)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Order not found".to_string()),
            other => AppError::Database(other),
        })?;

    tracing::info!(order_id = %order_id, status = %status, "Order status changed");
    Ok(Json(order))
}
