//! Order repository: listing, checkout, and status changes.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use shopfront_core::{
    CartId, CartItemId, CheckoutError, OrderId, OrderItemId, OrderStatus, PageRequest, Price,
    ProductId, UserId, plan_checkout,
};

use super::RepositoryError;
use super::carts::{CART_ITEM_SELECT, CartItemRow};
use crate::models::cart::CartItem;
use crate::models::order::{Order, OrderItem};
use crate::models::product::Product;

const ORDER_COLUMNS: &str = "id, user_id, total_amount, status, created_at, updated_at";

/// Errors that can occur while placing an order.
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    /// The user has no cart.
    #[error("Cart not found")]
    CartNotFound,

    /// The selection cannot be turned into an order.
    #[error(transparent)]
    Plan(#[from] CheckoutError),

    /// Database failure; the transaction was rolled back.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for PlaceOrderError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    total_amount: Price,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// An order item left-joined with its (possibly deleted) product.
#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: OrderItemId,
    order_id: OrderId,
    product_id: Option<ProductId>,
    product_name: String,
    quantity: i32,
    price: Price,
    created_at: DateTime<Utc>,
    p_name: Option<String>,
    p_description: Option<String>,
    p_price: Option<Price>,
    p_image: Option<String>,
    p_user_id: Option<UserId>,
    p_created_at: Option<DateTime<Utc>>,
    p_updated_at: Option<DateTime<Utc>>,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        let product = match (
            row.product_id,
            row.p_name,
            row.p_description,
            row.p_price,
            row.p_user_id,
            row.p_created_at,
            row.p_updated_at,
        ) {
            (
                Some(id),
                Some(name),
                Some(description),
                Some(price),
                Some(user_id),
                Some(created_at),
                Some(updated_at),
            ) => Some(Product {
                id,
                name,
                description,
                price,
                image: row.p_image,
                user_id,
                created_at,
                updated_at,
            }),
            _ => None,
        };

        Self {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
            price: row.price,
            created_at: row.created_at,
            product,
        }
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of orders, newest first, optionally for a single user and status.
    ///
    /// `user_id = None` lists every user's orders (admin console).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        user_id: Option<UserId>,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> Result<(Vec<Order>, i64), RepositoryError> {
        const FILTER: &str = "($1::int4 IS NULL OR user_id = $1) \
             AND ($2::order_status IS NULL OR status = $2)";

        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE {FILTER} \
             ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4"
        ))
        .bind(user_id)
        .bind(status)
        .bind(i64::from(page.limit()))
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM orders WHERE {FILTER}"))
            .bind(user_id)
            .bind(status)
            .fetch_one(self.pool)
            .await?;

        Ok((self.attach_items(rows).await?, total))
    }

    /// Get an order with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.attach_items(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Turn the selected items of a user's cart into a `PENDING` order.
    ///
    /// Runs in one transaction: the selected cart rows are locked, priced at
    /// the products' current prices, copied into order items, and removed from
    /// the cart. Unselected items are untouched. Any failure rolls back.
    ///
    /// # Errors
    ///
    /// - `PlaceOrderError::CartNotFound` if the user has no cart
    /// - `PlaceOrderError::Plan` if nothing selected is in the cart
    /// - `PlaceOrderError::Repository` on database failure
    #[instrument(skip(self, selected), fields(selected = selected.len()))]
    pub async fn place(
        &self,
        user_id: UserId,
        selected: &[CartItemId],
    ) -> Result<Order, PlaceOrderError> {
        let mut tx = self.pool.begin().await?;

        let cart_id: CartId = sqlx::query_scalar("SELECT id FROM carts WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(PlaceOrderError::CartNotFound)?;

        let lines = sqlx::query_as::<_, CartItemRow>(&format!(
            "{CART_ITEM_SELECT} WHERE ci.cart_id = $1 AND ci.id = ANY($2) \
             ORDER BY ci.id FOR UPDATE OF ci"
        ))
        .bind(cart_id)
        .bind(selected)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(|row| CartItem::from(row).to_checkout_line())
        .collect();

        let plan = plan_checkout(lines, selected)?;

        let order_id: OrderId = sqlx::query_scalar(
            "INSERT INTO orders (user_id, total_amount, status) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(user_id)
        .bind(plan.total)
        .bind(OrderStatus::Pending)
        .fetch_one(&mut *tx)
        .await?;

        for line in &plan.lines {
            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, product_name, quantity, price) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(order_id)
            .bind(line.product_id)
            .bind(&line.product_name)
            .bind(line.quantity)
            .bind(line.unit_price)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND id = ANY($2)")
            .bind(cart_id)
            .bind(plan.item_ids())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            order_id = %order_id,
            items = plan.lines.len(),
            total = %plan.total,
            "Order placed"
        );

        self.get_by_id(order_id)
            .await?
            .ok_or_else(|| RepositoryError::DataCorruption(format!("order {order_id} vanished")))
            .map_err(PlaceOrderError::from)
    }

    /// Move an order from `PENDING` to `PAID`.
    ///
    /// Returns `None` when the order is no longer pending, so two concurrent
    /// payments cannot both succeed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn mark_paid(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let updated: Option<OrderId> = sqlx::query_scalar(
            "UPDATE orders SET status = $2 WHERE id = $1 AND status = $3 RETURNING id",
        )
        .bind(id)
        .bind(OrderStatus::Paid)
        .bind(OrderStatus::Pending)
        .fetch_optional(self.pool)
        .await?;

        match updated {
            Some(id) => self.get_by_id(id).await,
            None => Ok(None),
        }
    }

    /// Write an order's status unconditionally (admin console).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    #[instrument(skip(self))]
    pub async fn set_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let updated: Option<OrderId> =
            sqlx::query_scalar("UPDATE orders SET status = $2 WHERE id = $1 RETURNING id")
                .bind(id)
                .bind(status)
                .fetch_optional(self.pool)
                .await?;

        let id = updated.ok_or(RepositoryError::NotFound)?;
        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn attach_items(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<OrderId> = rows.iter().map(|row| row.id).collect();

        let items = sqlx::query_as::<_, OrderItemRow>(
            "SELECT oi.id, oi.order_id, oi.product_id, oi.product_name, oi.quantity, \
                    oi.price, oi.created_at, \
                    p.name AS p_name, p.description AS p_description, p.price AS p_price, \
                    p.image AS p_image, p.user_id AS p_user_id, \
                    p.created_at AS p_created_at, p.updated_at AS p_updated_at \
             FROM order_items oi LEFT JOIN products p ON p.id = oi.product_id \
             WHERE oi.order_id = ANY($1) ORDER BY oi.id",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for item in items {
            by_order
                .entry(item.order_id)
                .or_default()
                .push(OrderItem::from(item));
        }

        Ok(rows
            .into_iter()
            .map(|row| Order {
                items: by_order.remove(&row.id).unwrap_or_default(),
                id: row.id,
                user_id: row.user_id,
                total_amount: row.total_amount,
                status: row.status,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
            .collect())
    }
}
