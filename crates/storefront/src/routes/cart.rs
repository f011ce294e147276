//! Cart route handlers.
//!
//! Every handler works on the caller's own cart. Item-level routes check
//! ownership before touching the row so another user's item answers 403.

use axum::extract::State;
use serde::Deserialize;
use tracing::instrument;

use shopfront_core::{CartItemId, ProductId, UserId};

use crate::db::{CartRepository, RepositoryError};
use crate::error::{AppError, Json, Path, Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::models::Cart;
use crate::state::AppState;

/// Add-to-cart body.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: Option<ProductId>,
    pub quantity: Option<i32>,
}

/// Quantity update body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateItemRequest {
    pub quantity: Option<i32>,
}

fn valid_quantity(quantity: Option<i32>) -> Result<i32> {
    quantity.filter(|q| *q >= 1).ok_or_else(invalid_quantity)
}

fn invalid_quantity() -> AppError {
    AppError::BadRequest("Valid quantity is required".to_string())
}

/// The caller's cart, created empty if needed.
///
/// GET /api/cart
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Cart>> {
    let cart = CartRepository::new(state.pool())
        .get_or_create(user.id)
        .await?;
    Ok(Json(cart))
}

/// Add a product, incrementing its quantity if it's already in the cart.
///
/// POST /api/cart
#[instrument(skip(state, user, req), fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<Cart>> {
    let product_id = req
        .product_id
        .ok_or_else(|| AppError::BadRequest("Product ID is required".to_string()))?;
    let quantity = valid_quantity(Some(req.quantity.unwrap_or(1)))?;

    if state.catalog().get(product_id).await?.is_none() {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    let cart = CartRepository::new(state.pool())
        .add_item(user.id, product_id, quantity)
        .await
        .map_err(|e| match e {
            // Deleted between the lookup and the insert
            RepositoryError::NotFound => AppError::NotFound("Product not found".to_string()),
            RepositoryError::OutOfRange(_) => invalid_quantity(),
            other => AppError::Database(other),
        })?;

    add_breadcrumb(
        "cart",
        "Added item",
        Some(&[("product_id", &product_id.to_string())]),
    );
    Ok(Json(cart))
}

/// Set an item's quantity.
///
/// PUT /api/cart/{item_id}
#[instrument(skip(state, user, req), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(item_id): Path<CartItemId>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<Cart>> {
    let quantity = valid_quantity(req.quantity)?;
    let carts = CartRepository::new(state.pool());

    check_owner(&carts, user.id, item_id).await?;
    carts
        .update_quantity(user.id, item_id, quantity)
        .await
        .map_err(item_not_found)?;

    Ok(Json(carts.get_or_create(user.id).await?))
}

/// Remove an item.
///
/// DELETE /api/cart/{item_id}
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(item_id): Path<CartItemId>,
) -> Result<Json<Cart>> {
    let carts = CartRepository::new(state.pool());

    check_owner(&carts, user.id, item_id).await?;
    carts
        .remove_item(user.id, item_id)
        .await
        .map_err(item_not_found)?;

    Ok(Json(carts.get_or_create(user.id).await?))
}

/// Remove every item.
///
/// DELETE /api/cart/clear
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Cart>> {
    let cart = CartRepository::new(state.pool())
        .clear(user.id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Cart not found".to_string()),
            other => AppError::Database(other),
        })?;
    Ok(Json(cart))
}

async fn check_owner(
    carts: &CartRepository<'_>,
    user_id: UserId,
    item_id: CartItemId,
) -> Result<()> {
    let owner = carts
        .item_owner(item_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cart item not found".to_string()))?;

    if owner.user_id != user_id {
        tracing::warn!(item_id = %item_id, "Attempt to modify another user's cart item");
        return Err(AppError::Forbidden("Forbidden".to_string()));
    }
    Ok(())
}

fn item_not_found(e: RepositoryError) -> AppError {
    match e {
        RepositoryError::NotFound => AppError::NotFound("Cart item not found".to_string()),
        other => AppError::Database(other),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_quantity() {
        assert_eq!(valid_quantity(Some(3)).unwrap(), 3);
        assert!(valid_quantity(Some(0)).is_err());
        assert!(valid_quantity(Some(-2)).is_err());
        assert!(valid_quantity(None).is_err());
    }

    #[test]
    fn test_add_request_camel_case() {
        let req: AddItemRequest = serde_json::from_str(r#"{"productId": 4}"#).unwrap();
        assert_eq!(req.product_id, Some(ProductId::new(4)));
        assert_eq!(req.quantity, None);
    }
}
