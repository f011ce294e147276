//! Database-backed tests for order status changes and listing.
//!
//! These tests require a `PostgreSQL` database named by `TEST_DATABASE_URL`.

use shopfront_core::{OrderStatus, PageRequest};
use shopfront_integration_tests::{create_product, create_user, test_pool};
use shopfront_storefront::db::{CartRepository, OrderRepository, RepositoryError};
use shopfront_storefront::models::{Order, User};
use sqlx::PgPool;

async fn place_order(pool: &PgPool, user: &User) -> Order {
    let product = create_product(pool, user.id, "Candle", "7.50").await;
    let cart = CartRepository::new(pool)
        .add_item(user.id, product.id, 1)
        .await
        .expect("add to cart");
    let selected: Vec<_> = cart.items.iter().map(|i| i.id).collect();
    OrderRepository::new(pool)
        .place(user.id, &selected)
        .await
        .expect("place order")
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_payment_only_from_pending() {
    let pool = test_pool().await;
    let user = create_user(&pool, "pay").await;
    let order = place_order(&pool, &user).await;
    let orders = OrderRepository::new(&pool);

    let paid = orders.mark_paid(order.id).await.expect("pay").expect("was pending");
    assert_eq!(paid.status, OrderStatus::Paid);

    // Second payment finds nothing pending
    assert!(orders.mark_paid(order.id).await.expect("repay").is_none());

    let cancelled = place_order(&pool, &user).await;
    orders
        .set_status(cancelled.id, OrderStatus::Cancelled)
        .await
        .expect("cancel");
    assert!(orders.mark_paid(cancelled.id).await.expect("pay cancelled").is_none());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_set_status_missing_order() {
    let pool = test_pool().await;
    let result = OrderRepository::new(&pool)
        .set_status(shopfront_core::OrderId::new(i32::MAX), OrderStatus::Shipped)
        .await;
    assert!(matches!(result, Err(RepositoryError::NotFound)));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_list_is_scoped_to_user() {
    let pool = test_pool().await;
    let alice = create_user(&pool, "list-alice").await;
    let bob = create_user(&pool, "list-bob").await;
    let first = place_order(&pool, &alice).await;
    let second = place_order(&pool, &alice).await;
    place_order(&pool, &bob).await;
    let orders = OrderRepository::new(&pool);

    let (mine, total) = orders
        .list(Some(alice.id), None, PageRequest::new(None, None, 10))
        .await
        .expect("list");
    assert_eq!(total, 2);
    // Newest first
    let ids: Vec<_> = mine.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
    assert!(mine.iter().all(|o| o.user_id == alice.id));

    orders.mark_paid(first.id).await.expect("pay").expect("pending");
    let (paid, total) = orders
        .list(Some(alice.id), Some(OrderStatus::Paid), PageRequest::new(None, None, 10))
        .await
        .expect("list paid");
    assert_eq!(total, 1);
    assert_eq!(paid.first().map(|o| o.id), Some(first.id));
}
