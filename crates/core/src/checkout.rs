//! Cart-to-order planning.
//!
//! Checkout converts a subset of a shopper's cart into an order. The database
//! side (locking rows, inserting the order, removing cart items) lives in the
//! storefront crate; this module decides *what* gets ordered and what it costs
//! so the arithmetic can be tested without a database.

use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;

use crate::types::{CartItemId, Price, ProductId};

/// A cart row as seen by checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLine {
    pub item_id: CartItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Price,
    pub quantity: i32,
}

impl CheckoutLine {
    /// `unit_price * quantity`, or `None` on overflow or a non-positive quantity.
    #[must_use]
    pub fn line_total(&self) -> Option<Price> {
        self.unit_price.checked_mul_qty(self.quantity)
    }
}

/// The lines that will become order items, plus the order total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPlan {
    pub lines: Vec<CheckoutLine>,
    pub total: Price,
}

impl CheckoutPlan {
    /// Cart item IDs consumed by this plan.
    #[must_use]
    pub fn item_ids(&self) -> Vec<CartItemId> {
        self.lines.iter().map(|line| line.item_id).collect()
    }
}

/// Reasons a checkout cannot be planned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("No items selected for checkout")]
    NothingSelected,
    #[error("Selected items not found in cart")]
    SelectionNotInCart,
    #[error("Order total exceeds the maximum allowed amount")]
    TotalOverflow,
}

/// Plan a checkout of `selected` items out of `cart`.
///
/// Duplicate IDs in `selected` are collapsed, and IDs that do not belong to
/// the cart are ignored as long as at least one of them does. Lines keep the
/// cart's order.
///
/// # Errors
///
/// - [`CheckoutError::NothingSelected`] when `selected` is empty
/// - [`CheckoutError::SelectionNotInCart`] when no selected ID is in the cart
/// - [`CheckoutError::TotalOverflow`] when a line or the total exceeds [`Price::MAX`]
///
/// ```
/// use shopfront_core::{CartItemId, CheckoutLine, Price, ProductId, plan_checkout};
///
/// let cart = vec![CheckoutLine {
///     item_id: CartItemId::new(1),
///     product_id: ProductId::new(9),
///     product_name: "Mug".to_owned(),
///     unit_price: Price::parse("4.50").unwrap(),
///     quantity: 2,
/// }];
/// let plan = plan_checkout(cart, &[CartItemId::new(1)]).unwrap();
/// assert_eq!(plan.total, Price::parse("9.00").unwrap());
/// ```
pub fn plan_checkout(
    cart: Vec<CheckoutLine>,
    selected: &[CartItemId],
) -> Result<CheckoutPlan, CheckoutError> {
    if selected.is_empty() {
        return Err(CheckoutError::NothingSelected);
    }
    let wanted: BTreeSet<CartItemId> = selected.iter().copied().collect();

    let lines: Vec<CheckoutLine> = cart
        .into_iter()
        .filter(|line| wanted.contains(&line.item_id))
        .collect();
    if lines.is_empty() {
        return Err(CheckoutError::SelectionNotInCart);
    }

    let total = lines.iter().try_fold(Price::ZERO, |acc, line| {
        line.line_total()
            .and_then(|line_total| acc.checked_add(line_total))
            .ok_or(CheckoutError::TotalOverflow)
    })?;

    Ok(CheckoutPlan { lines, total })
}
