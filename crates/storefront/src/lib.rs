//! Shopfront storefront library.
//!
//! This crate provides the storefront API as a library, allowing it to be
//! tested and reused. The binary in `main.rs` adds Sentry and serves it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, middleware as axum_middleware};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router with its middleware stack.
///
/// Layers (outermost first): tracing, request ID, security headers, session.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.pool(), state.config());

    routes::routes()
        .layer(session_layer)
        .layer(axum_middleware::from_fn_with_state(
            state.config().is_secure(),
            middleware::security_headers_middleware,
        ))
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::extract::Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::config::{PaymentConfig, StorefrontConfig};

    fn test_app() -> Router {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/unused"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from("k7Qz2mVx9pLw4RtN8bYc3HdF6sJg1aEu"),
            session_ttl: Duration::from_secs(3600),
            payment: PaymentConfig::default(),
            media: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        // Never connects: every request below is answered before a query runs
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        app(AppState::new(config, pool).unwrap())
    }

    fn request(method: &str, uri: &str, body: Option<&str>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-forwarded-for", "203.0.113.9");
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_owned()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = test_app().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(request("GET", "/health", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");
    }

    #[tokio::test]
    async fn test_protected_routes_require_session() {
        for (method, uri) in [
            ("GET", "/api/cart"),
            ("DELETE", "/api/cart/clear"),
            ("GET", "/api/orders"),
            ("POST", "/api/orders/1/payment"),
            ("GET", "/api/auth/session"),
            ("DELETE", "/api/upload?url=x"),
        ] {
            let (status, body) = send(request(method, uri, None)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
            assert_eq!(body, serde_json::json!({ "error": "Unauthorized" }));
        }
    }

    #[tokio::test]
    async fn test_admin_routes_require_session() {
        let (status, _) = send(request("GET", "/api/admin/orders", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_register_missing_fields() {
        let (status, body) = send(request("POST", "/api/user", Some(r#"{"name":"  "}"#))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({ "error": "Missing required fields" }));
    }

    #[tokio::test]
    async fn test_register_weak_password() {
        let (status, _) = send(request(
            "POST",
            "/api/user",
            Some(r#"{"name":"Sam","email":"sam@example.com","password":"short"}"#),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_json_is_json_error() {
        let (status, body) = send(request("POST", "/api/auth/login", Some("{not json"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.get("error").is_some());
    }

    #[tokio::test]
    async fn test_bad_query_is_json_error() {
        let (status, body) = send(request("GET", "/api/products?page=abc", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.get("error").is_some());

        let (status, body) = send(request("GET", "/api/products?minPrice=cheap", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({ "error": "Invalid minPrice" }));
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, _) = send(request("GET", "/api/nope", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
