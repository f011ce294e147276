//! Cart domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use shopfront_core::{CartId, CartItemId, CheckoutLine, Price, ProductId, UserId};

use super::product::Product;

/// A cart line with its product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub product: Product,
}

impl CartItem {
    /// The line as checkout sees it, priced at the product's current price.
    #[must_use]
    pub fn to_checkout_line(&self) -> CheckoutLine {
        CheckoutLine {
            item_id: self.id,
            product_id: self.product_id,
            product_name: self.product.name.clone(),
            unit_price: self.product.price,
            quantity: self.quantity,
        }
    }
}

/// A user's cart with derived totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub items: Vec<CartItem>,
    /// Sum of quantities.
    pub total_items: i64,
    /// Sum of `price * quantity` at current prices.
    pub total_price: Price,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Assemble a cart and compute its totals.
    #[must_use]
    pub fn new(
        id: CartId,
        user_id: UserId,
        items: Vec<CartItem>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let total_items = items.iter().map(|item| i64::from(item.quantity)).sum();
        let total_price = items
            .iter()
            .map(|item| item.product.price.saturating_mul_qty(item.quantity))
            .sum();
        Self {
            id,
            user_id,
            items,
            total_items,
            total_price,
            created_at,
            updated_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: i32, price: &str, quantity: i32) -> CartItem {
        let now = Utc::now();
        CartItem {
            id: CartItemId::new(id),
            cart_id: CartId::new(1),
            product_id: ProductId::new(id),
            quantity,
            created_at: now,
            updated_at: now,
            product: Product {
                id: ProductId::new(id),
                name: format!("Product {id}"),
                description: "A thing".to_string(),
                price: Price::parse(price).unwrap(),
                image: None,
                user_id: UserId::new(9),
                created_at: now,
                updated_at: now,
            },
        }
    }

    #[test]
    fn test_totals() {
        let now = Utc::now();
        let cart = Cart::new(
            CartId::new(1),
            UserId::new(2),
            vec![item(1, "2.50", 2), item(2, "10.00", 1)],
            now,
            now,
        );
        assert_eq!(cart.total_items, 3);
        assert_eq!(cart.total_price, Price::parse("15.00").unwrap());
    }

    #[test]
    fn test_overflowing_line_saturates_total() {
        let now = Utc::now();
        let cart = Cart::new(
            CartId::new(1),
            UserId::new(2),
            vec![item(1, "5.00", 1), item(2, "9999999999.99", 2)],
            now,
            now,
        );
        assert_eq!(cart.total_items, 3);
        assert_eq!(cart.total_price.amount(), Price::MAX);
    }

    #[test]
    fn test_empty_cart_json_shape() {
        let now = Utc::now();
        let cart = Cart::new(CartId::new(5), UserId::new(2), Vec::new(), now, now);
        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(json["id"], 5);
        assert_eq!(json["userId"], 2);
        assert_eq!(json["items"], serde_json::json!([]));
        assert_eq!(json["totalItems"], 0);
        assert_eq!(json["totalPrice"], "0.00");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_checkout_line() {
        let line = item(3, "4.00", 5).to_checkout_line();
        assert_eq!(line.item_id, CartItemId::new(3));
        assert_eq!(line.product_name, "Product 3");
        assert_eq!(line.quantity, 5);
        assert_eq!(line.unit_price, Price::parse("4").unwrap());
    }
}
