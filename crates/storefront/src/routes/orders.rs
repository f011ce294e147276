//! Order route handlers: history, checkout, and payment.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use shopfront_core::{CartItemId, OrderId, OrderStatus, PageRequest, PaymentMethod};

use crate::db::OrderRepository;
use crate::error::{AppError, Json, Path, Query, Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::models::{Order, OrderPage};
use crate::state::AppState;

/// Default page size of order listings.
pub(super) const DEFAULT_LIMIT: u32 = 10;

/// Order listing query parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OrderListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<String>,
}

impl OrderListQuery {
    /// Split into a status filter and a page request.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for an unknown status.
    pub fn into_parts(self) -> Result<(Option<OrderStatus>, PageRequest)> {
        let status = parse_status(self.status.as_deref())?;
        Ok((status, PageRequest::new(self.page, self.limit, DEFAULT_LIMIT)))
    }
}

/// Parse an optional status parameter. Blank means no filter.
pub(super) fn parse_status(value: Option<&str>) -> Result<Option<OrderStatus>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => v
            .parse::<OrderStatus>()
            .map(Some)
            .map_err(|_| AppError::BadRequest("Invalid status".to_string())),
        None => Ok(None),
    }
}

/// Checkout body.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub selected_items: Vec<CartItemId>,
}

/// Payment body.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaymentRequest {
    pub payment_method: PaymentMethod,
}

/// Successful payment.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub success: bool,
    pub order: Order,
    pub payment_method: PaymentMethod,
    pub transaction_id: String,
}

/// The caller's orders, newest first.
///
/// GET /api/orders
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<OrderPage>> {
    let (status, page) = query.into_parts()?;
    let (orders, total) = OrderRepository::new(state.pool())
        .list(Some(user.id), status, page)
        .await?;
    Ok(Json(OrderPage::new(orders, total, page)))
}

/// One of the caller's orders.
///
/// GET /api/orders/{order_id}
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(order_id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .get_by_id(order_id)
        .await?
        .filter(|order| order.user_id == user.id)
        .ok_or_else(order_not_found)?;
    Ok(Json(order))
}

/// Turn the selected cart items into a pending order.
///
/// POST /api/orders
#[instrument(skip(state, user, req), fields(user_id = %user.id))]
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<CheckoutRequest>,
) -> Result<impl IntoResponse> {
    if req.selected_items.is_empty() {
        return Err(AppError::BadRequest(
            "No items selected for checkout".to_string(),
        ));
    }

    let order = OrderRepository::new(state.pool())
        .place(user.id, &req.selected_items)
        .await?;

    add_breadcrumb(
        "checkout",
        "Order placed",
        Some(&[("order_id", &order.id.to_string())]),
    );
    Ok((StatusCode::CREATED, Json(order)))
}

/// Pay a pending order through the simulated gateway.
///
/// POST /api/orders/{order_id}/payment
#[instrument(skip(state, user, req), fields(user_id = %user.id))]
pub async fn pay(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(order_id): Path<OrderId>,
    Json(req): Json<PaymentRequest>,
) -> Result<Json<PaymentResponse>> {
    let orders = OrderRepository::new(state.pool());

    let order = orders
        .get_by_id(order_id)
        .await?
        .ok_or_else(order_not_found)?;
    if order.user_id != user.id {
        return Err(AppError::Forbidden("Forbidden".to_string()));
    }
    if !order.status.awaits_payment() {
        return Err(not_pending());
    }

    let receipt = state
        .payment()
        .charge(order_id, req.payment_method)
        .await?;

    // A concurrent payment may have won the race
    let order = orders.mark_paid(order_id).await?.ok_or_else(not_pending)?;

    tracing::info!(order_id = %order_id, "Order paid");
    Ok(Json(PaymentResponse {
        success: true,
        order,
        payment_method: receipt.method,
        transaction_id: receipt.transaction_id,
    }))
}

fn order_not_found() -> AppError {
    AppError::NotFound("Order not found".to_string())
}

fn not_pending() -> AppError {
    AppError::BadRequest("Order is not in pending status".to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status(None).unwrap(), None);
        assert_eq!(parse_status(Some("  ")).unwrap(), None);
        assert_eq!(
            parse_status(Some("shipped")).unwrap(),
            Some(OrderStatus::Shipped)
        );
        assert!(matches!(
            parse_status(Some("LOST")),
            Err(AppError::BadRequest(msg)) if msg == "Invalid status"
        ));
    }

    #[test]
    fn test_order_list_defaults() {
        let (status, page) = OrderListQuery::default().into_parts().unwrap();
        assert_eq!(status, None);
        assert_eq!(page.limit(), DEFAULT_LIMIT);
        assert_eq!(page.page(), 1);
    }

    #[test]
    fn test_payment_method_defaults_to_credit_card() {
        let req: PaymentRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.payment_method, PaymentMethod::CreditCard);

        let req: PaymentRequest =
            serde_json::from_str(r#"{"paymentMethod":"apple_pay"}"#).unwrap();
        assert_eq!(req.payment_method, PaymentMethod::ApplePay);
    }

    #[test]
    fn test_checkout_request_shape() {
        let req: CheckoutRequest = serde_json::from_str(r#"{"selectedItems":[3,3,9]}"#).unwrap();
        assert_eq!(
            req.selected_items,
            vec![CartItemId::new(3), CartItemId::new(3), CartItemId::new(9)]
        );

        let req: CheckoutRequest = serde_json::from_str("{}").unwrap();
        assert!(req.selected_items.is_empty());
    }
}
