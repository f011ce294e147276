//! Integration tests for Shopfront.
//!
//! # Running Tests
//!
//! ```bash
//! # Database-backed repository tests
//! TEST_DATABASE_URL=postgres://localhost/shopfront_test \
//!     cargo test -p shopfront-integration-tests -- --ignored
//!
//! # HTTP tests additionally need a running server
//! STOREFRONT_BASE_URL=http://localhost:3000 \
//!     cargo test -p shopfront-integration-tests --test storefront_api -- --ignored
//! ```
//!
//! Every test creates its own users with unique emails, so tests can share
//! one database and run in parallel.

use reqwest::Client;
use secrecy::SecretString;
use sqlx::PgPool;
use uuid::Uuid;

use shopfront_core::{Email, Price, UserId};
use shopfront_storefront::db::{ProductRepository, UserRepository};
use shopfront_storefront::models::{NewProduct, Product, User};

/// Not a real argon2 hash; repository tests never verify passwords.
const PLACEHOLDER_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA";

/// Connect to the test database and bring its schema up to date.
///
/// # Panics
///
/// Panics if no database URL is set or the database is unreachable.
pub async fn test_pool() -> PgPool {
    let url = std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("STOREFRONT_DATABASE_URL"))
        .map(SecretString::from)
        .expect("TEST_DATABASE_URL or STOREFRONT_DATABASE_URL must be set");

    let pool = shopfront_storefront::db::create_pool(&url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("../storefront/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// An email no other test run will use.
///
/// # Panics
///
/// Never in practice: the generated address is always valid.
#[must_use]
pub fn unique_email(prefix: &str) -> Email {
    Email::parse(&format!("{prefix}-{}@example.com", Uuid::new_v4().simple()))
        .expect("generated email is valid")
}

/// Insert a customer.
///
/// # Panics
///
/// Panics if the insert fails.
pub async fn create_user(pool: &PgPool, prefix: &str) -> User {
    UserRepository::new(pool)
        .create(prefix, &unique_email(prefix), PLACEHOLDER_HASH)
        .await
        .expect("Failed to create test user")
}

/// Insert a product owned by `owner` at `price` (e.g. `"12.50"`).
///
/// # Panics
///
/// Panics if the price is invalid or the insert fails.
pub async fn create_product(pool: &PgPool, owner: UserId, name: &str, price: &str) -> Product {
    let product = NewProduct::new(
        Some(name.to_owned()),
        Some(format!("{name} for integration tests")),
        Some(Price::parse(price).expect("valid test price")),
        None,
    )
    .expect("valid test product");

    ProductRepository::new(pool)
        .create(owner, &product)
        .await
        .expect("Failed to create test product")
}

/// Base URL of a running storefront server.
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// HTTP client that keeps the session cookie between requests.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn session_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}
