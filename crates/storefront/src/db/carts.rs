//! Cart repository for database operations.
//!
//! A user owns at most one cart (`carts.user_id` is unique) and a product
//! appears at most once per cart (`UNIQUE (cart_id, product_id)`).

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use shopfront_core::{CartId, CartItemId, Price, ProductId, UserId};

use super::RepositoryError;
use crate::models::cart::{Cart, CartItem};
use crate::models::product::Product;

#[derive(sqlx::FromRow)]
struct CartRow {
    id: CartId,
    user_id: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// A cart item joined with its product.
#[derive(sqlx::FromRow)]
pub(super) struct CartItemRow {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub product_name: String,
    pub product_description: String,
    pub product_price: Price,
    pub product_image: Option<String>,
    pub product_user_id: UserId,
    pub product_created_at: DateTime<Utc>,
    pub product_updated_at: DateTime<Utc>,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        Self {
            id: row.id,
            cart_id: row.cart_id,
            product_id: row.product_id,
            quantity: row.quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
            product: Product {
                id: row.product_id,
                name: row.product_name,
                description: row.product_description,
                price: row.product_price,
                image: row.product_image,
                user_id: row.product_user_id,
                created_at: row.product_created_at,
                updated_at: row.product_updated_at,
            },
        }
    }
}

/// Select list for [`CartItemRow`]; expects `cart_items ci` joined to `products p`.
pub(super) const CART_ITEM_SELECT: &str = "SELECT ci.id, ci.cart_id, ci.product_id, ci.quantity, \
            ci.created_at, ci.updated_at, \
            p.name AS product_name, p.description AS product_description, \
            p.price AS product_price, p.image AS product_image, \
            p.user_id AS product_user_id, p.created_at AS product_created_at, \
            p.updated_at AS product_updated_at \
     FROM cart_items ci JOIN products p ON p.id = ci.product_id";

/// Where a cart item lives and who owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct CartItemOwner {
    pub item_id: CartItemId,
    pub cart_id: CartId,
    pub user_id: UserId,
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load a user's cart with items, or `None` if they have never had one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn find_by_user(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            "SELECT id, user_id, created_at, updated_at FROM carts WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.assemble(row).await?)),
            None => Ok(None),
        }
    }

    /// Load a user's cart, creating an empty one if needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn get_or_create(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        let row = self.ensure_cart(user_id).await?;
        self.assemble(row).await
    }

    /// Add `quantity` of a product to the user's cart.
    ///
    /// Creates the cart if needed. If the product is already in the cart its
    /// quantity is incremented in the same statement, so concurrent adds never
    /// produce a duplicate row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::OutOfRange` if the summed quantity overflows.
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<Cart, RepositoryError> {
        let cart = self.ensure_cart(user_id).await?;

        sqlx::query(
            "INSERT INTO cart_items (cart_id, product_id, quantity) VALUES ($1, $2, $3) \
             ON CONFLICT (cart_id, product_id) \
             DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity",
        )
        .bind(cart.id)
        .bind(product_id)
        .bind(quantity)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            if RepositoryError::is_out_of_range(&e) {
                return RepositoryError::OutOfRange("quantity".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        self.assemble(cart).await
    }

    /// Look up a cart item's owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn item_owner(
        &self,
        item_id: CartItemId,
    ) -> Result<Option<CartItemOwner>, RepositoryError> {
        let owner = sqlx::query_as::<_, CartItemOwner>(
            "SELECT ci.id AS item_id, ci.cart_id, c.user_id \
             FROM cart_items ci JOIN carts c ON c.id = ci.cart_id WHERE ci.id = $1",
        )
        .bind(item_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(owner)
    }

    /// Set an item's quantity. Scoped to the owner's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item isn't in the user's cart.
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        user_id: UserId,
        item_id: CartItemId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE cart_items ci SET quantity = $3 FROM carts c \
             WHERE ci.id = $1 AND ci.cart_id = c.id AND c.user_id = $2",
        )
        .bind(item_id)
        .bind(user_id)
        .bind(quantity)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Remove an item. Scoped to the owner's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item isn't in the user's cart.
    #[instrument(skip(self))]
    pub async fn remove_item(
        &self,
        user_id: UserId,
        item_id: CartItemId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM cart_items ci USING carts c \
             WHERE ci.id = $1 AND ci.cart_id = c.id AND c.user_id = $2",
        )
        .bind(item_id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Remove every item from the user's cart and return the empty cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no cart.
    #[instrument(skip(self))]
    pub async fn clear(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            "SELECT id, user_id, created_at, updated_at FROM carts WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(row.id)
            .execute(self.pool)
            .await?;

        Ok(Cart::new(
            row.id,
            row.user_id,
            Vec::new(),
            row.created_at,
            row.updated_at,
        ))
    }

    async fn ensure_cart(&self, user_id: UserId) -> Result<CartRow, RepositoryError> {
        sqlx::query("INSERT INTO carts (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        let row = sqlx::query_as::<_, CartRow>(
            "SELECT id, user_id, created_at, updated_at FROM carts WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(row)
    }

    async fn assemble(&self, row: CartRow) -> Result<Cart, RepositoryError> {
        let items = sqlx::query_as::<_, CartItemRow>(&format!(
            "{CART_ITEM_SELECT} WHERE ci.cart_id = $1 ORDER BY ci.created_at, ci.id"
        ))
        .bind(row.id)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(CartItem::from)
        .collect();

        Ok(Cart::new(
            row.id,
            row.user_id,
            items,
            row.created_at,
            row.updated_at,
        ))
    }
}
