//! Order domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use shopfront_core::{OrderId, OrderItemId, OrderStatus, Price, ProductId, UserId};

use super::product::Product;

/// A purchased line. Name and unit price are snapshots taken at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    /// `None` once the product has been deleted.
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub quantity: i32,
    /// Unit price at checkout.
    pub price: Price,
    pub created_at: DateTime<Utc>,
    /// The live product, if it still exists.
    pub product: Option<Product>,
}

/// An order with its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub total_amount: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}
