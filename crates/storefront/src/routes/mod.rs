//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                          - Liveness
//! GET    /health/ready                    - Readiness (database ping)
//!
//! # Auth
//! POST   /api/user                        - Register
//! POST   /api/auth/login                  - Login
//! POST   /api/auth/logout                 - Logout
//! GET    /api/auth/session                - Current user
//!
//! # Products
//! GET    /api/products                    - Filtered, paginated catalog
//! POST   /api/products                    - Create (auth)
//! GET    /api/products/{id}               - Product detail
//! PUT    /api/products/{id}               - Update (owner or admin)
//! DELETE /api/products/{id}               - Delete (owner or admin)
//! GET    /api/products/user/{userId}      - Products owned by a user
//!
//! # Cart (auth)
//! GET    /api/cart                        - Current cart
//! POST   /api/cart                        - Add product
//! DELETE /api/cart/clear                  - Remove all items
//! PUT    /api/cart/{itemId}               - Set quantity
//! DELETE /api/cart/{itemId}               - Remove item
//!
//! # Orders (auth)
//! GET    /api/orders                      - Order history
//! POST   /api/orders                      - Checkout selected cart items
//! GET    /api/orders/{orderId}            - Order detail
//! POST   /api/orders/{orderId}/payment    - Pay a pending order
//!
//! # Admin console (admin)
//! GET    /api/admin/products              - Catalog listing
//! GET    /api/admin/orders                - All orders
//! PUT    /api/admin/orders/{orderId}/status - Write order status
//!
//! # Upload (auth)
//! POST   /api/upload                      - Upload an image (multipart `file`)
//! DELETE /api/upload?url=                 - Delete an uploaded image
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod orders;
pub mod products;
pub mod upload;

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    middleware::map_response,
    routing::{delete, get, post, put},
};
use serde::Serialize;

use crate::middleware::{api_rate_limiter, auth_rate_limiter, rate_limited_json};
use crate::state::AppState;

/// Largest accepted image upload.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// `{"message": "..."}` response body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    #[must_use]
    pub const fn new(message: &'static str) -> Self {
        Self { message }
    }
}

/// Registration and login: strictly rate limited.
pub fn credential_routes() -> Router<AppState> {
    Router::new()
        .route("/user", post(auth::register))
        .route("/auth/login", post(auth::login))
        .layer(auth_rate_limiter())
}

/// Session routes.
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/logout", post(auth::logout))
        .route("/session", get(auth::session))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::destroy),
        )
        .route("/user/{user_id}", get(products::by_owner))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).post(cart::add))
        .route("/clear", delete(cart::clear))
        .route("/{item_id}", put(cart::update).delete(cart::remove))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::checkout))
        .route("/{order_id}", get(orders::show))
        .route("/{order_id}/payment", post(orders::pay))
}

/// Create the admin console routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(admin::products))
        .route("/orders", get(admin::orders))
        .route("/orders/{order_id}/status", put(admin::set_order_status))
}

/// Create the upload routes router.
pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(upload::upload).delete(upload::destroy))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// Everything under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(credential_routes())
        .nest("/auth", session_routes())
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/orders", order_routes())
        .nest("/admin", admin_routes())
        .nest("/upload", upload_routes())
        .layer(api_rate_limiter())
        .layer(map_response(rate_limited_json))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", api_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
