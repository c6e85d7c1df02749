//! # Routes
//!
//! Axum router configuration for the shoplite API.
//!
//! - `POST /api/create-checkout-session` — rate-limited, then auth
//! - `GET  /api/verify-checkout-session` — auth
//! - `POST /api/stripe-webhook` — signature-verified, raw body
//! - `POST /api/verifyUser` — rate-limited
//! - `GET  /health` — health check

use crate::state::AppState;
use crate::{auth, handlers, rate_limit};
use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    // CORS restricted to the configured frontend origin
    let origin = state
        .urls
        .origin()
        .parse::<HeaderValue>()
        .expect("Invalid FRONTEND_URL origin");
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any);

    // Rate limiting runs before authentication on sensitive routes, so
    // excess requests never reach the identity provider
    let checkout_routes = Router::new()
        .route(
            "/create-checkout-session",
            post(handlers::create_checkout_session),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::limit_checkout,
        ));

    let verify_routes = Router::new()
        .route(
            "/verify-checkout-session",
            get(handlers::verify_checkout_session),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    let user_routes = Router::new()
        .route("/verifyUser", post(handlers::verify_user))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::limit_verify_user,
        ));

    // Webhook route: unauthenticated, signature-verified, raw body
    let webhook_routes = Router::new().route("/stripe-webhook", post(handlers::stripe_webhook));

    let api_routes = Router::new()
        .merge(checkout_routes)
        .merge(verify_routes)
        .merge(user_routes)
        .merge(webhook_routes);

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppConfig;
    use async_trait::async_trait;
    use axum::http::{HeaderName, StatusCode};
    use axum_test::TestServer;
    use chrono::Utc;
    use shop_core::{
        AuthenticatedUser, CatalogStore, CheckoutSession, Currency, IdentityVerifier,
        LoggingOrderStore, Order, PaymentGateway, Price, Product, SessionStatus, ShippingPolicy,
        ShopError, ShopResult, WebhookEvent, WebhookEventKind,
    };
    use std::sync::Arc;

    struct StubStore;

    #[async_trait]
    impl CatalogStore for StubStore {
        async fn list_products(&self) -> ShopResult<Vec<Product>> {
            Ok(vec![
                Product::new("p1", "Phone One", Price::new(500.0, Currency::USD))
                    .with_images(vec!["https://cdn/p1.jpg".into()]),
                Product::new("p2", "Phone Two", Price::new(650.0, Currency::USD)),
            ])
        }
    }

    #[derive(Default)]
    struct StubGateway;

    #[async_trait]
    impl PaymentGateway for StubGateway {
        async fn create_session(
            &self,
            order: &Order,
            _shipping: &ShippingPolicy,
            _success_url: &str,
            _cancel_url: &str,
        ) -> ShopResult<CheckoutSession> {
            Ok(CheckoutSession {
                session_id: "cs_test_1".into(),
                order_id: order.id.clone(),
                redirect_url: "https://checkout.stripe.test/c/pay/cs_test_1".into(),
                created_at: Utc::now(),
            })
        }

        async fn retrieve_session(&self, session_id: &str) -> ShopResult<SessionStatus> {
            Ok(SessionStatus {
                payment_status: if session_id == "cs_paid" {
                    "paid".into()
                } else {
                    "unpaid".into()
                },
            })
        }

        async fn verify_webhook(
            &self,
            _payload: &[u8],
            signature: &str,
        ) -> ShopResult<WebhookEvent> {
            if signature != "t=1,v1=valid" {
                return Err(ShopError::WebhookVerificationFailed(
                    "Signature mismatch".into(),
                ));
            }
            Ok(WebhookEvent {
                event_id: "evt_1".into(),
                kind: WebhookEventKind::PaymentSucceeded,
                order_id: Some("order-1".into()),
                payment_id: Some("pi_1".into()),
                raw: None,
                timestamp: Utc::now(),
            })
        }

        fn provider_name(&self) -> &'static str {
            "stub"
        }
    }

    struct StubIdentity;

    #[async_trait]
    impl IdentityVerifier for StubIdentity {
        async fn verify_token(&self, raw_token: &str) -> ShopResult<AuthenticatedUser> {
            match raw_token {
                "valid-token" => Ok(AuthenticatedUser {
                    uid: "user-1".into(),
                    email: Some("user@example.com".into()),
                    admin: false,
                }),
                "admin-token" => Ok(AuthenticatedUser {
                    uid: "admin-1".into(),
                    email: Some("admin@example.com".into()),
                    admin: true,
                }),
                _ => Err(ShopError::Authentication("Invalid or expired token".into())),
            }
        }
    }

    fn test_server() -> TestServer {
        let config = AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            frontend_url: "https://shop.example.com/".into(),
            catalog_store_url: "http://localhost:9000".into(),
            identity_verify_url: "http://localhost:9001/verify".into(),
            environment: "test".into(),
        };
        let state = AppState::with_collaborators(
            config,
            Arc::new(StubStore),
            Arc::new(StubGateway::default()),
            Arc::new(StubIdentity),
            Arc::new(LoggingOrderStore),
        );
        TestServer::new(create_router(state)).unwrap()
    }

    fn auth_header() -> (HeaderName, axum::http::HeaderValue) {
        (
            HeaderName::from_static("authorization"),
            axum::http::HeaderValue::from_static("Bearer valid-token"),
        )
    }

    #[tokio::test]
    async fn test_health() {
        let server = test_server();
        let response = server.get("/health").await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["service"], "shoplite");
    }

    #[tokio::test]
    async fn test_checkout_requires_token() {
        let server = test_server();
        let response = server
            .post("/api/create-checkout-session")
            .json(&serde_json::json!({ "items": [] }))
            .await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "No token provided");
    }

    #[tokio::test]
    async fn test_checkout_returns_redirect_url() {
        let server = test_server();
        let (name, value) = auth_header();

        let response = server
            .post("/api/create-checkout-session")
            .add_header(name, value)
            .json(&serde_json::json!({
                "items": [{ "id": "p1", "quantity": 2, "selectedSize": "128GB" }]
            }))
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["url"], "https://checkout.stripe.test/c/pay/cs_test_1");
    }

    #[tokio::test]
    async fn test_checkout_rejects_missing_or_non_array_items() {
        let server = test_server();

        for payload in [
            serde_json::json!({}),
            serde_json::json!({ "items": "p1" }),
            serde_json::json!({ "items": 42 }),
        ] {
            let (name, value) = auth_header();
            let response = server
                .post("/api/create-checkout-session")
                .add_header(name, value)
                .json(&payload)
                .await;

            assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
            let body: serde_json::Value = response.json();
            assert_eq!(body["error"], "Invalid items array");
        }
    }

    #[tokio::test]
    async fn test_checkout_unknown_product_is_not_found() {
        let server = test_server();
        let (name, value) = auth_header();

        let response = server
            .post("/api/create-checkout-session")
            .add_header(name, value)
            .json(&serde_json::json!({ "items": [{ "id": "ghost", "quantity": 1 }] }))
            .await;

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Product not found: ghost");
    }

    #[tokio::test]
    async fn test_verify_session_missing_id() {
        let server = test_server();
        let (name, value) = auth_header();

        let response = server
            .get("/api/verify-checkout-session")
            .add_header(name, value)
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Missing session ID");
    }

    #[tokio::test]
    async fn test_verify_session_paid_status() {
        let server = test_server();

        let (name, value) = auth_header();
        let response = server
            .get("/api/verify-checkout-session")
            .add_query_param("sessionId", "cs_paid")
            .add_header(name, value)
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["paid"], true);

        let (name, value) = auth_header();
        let response = server
            .get("/api/verify-checkout-session")
            .add_query_param("sessionId", "cs_open")
            .add_header(name, value)
            .await;
        let body: serde_json::Value = response.json();
        assert_eq!(body["paid"], false);
    }

    #[tokio::test]
    async fn test_webhook_rejects_bad_signature() {
        let server = test_server();

        let response = server
            .post("/api/stripe-webhook")
            .add_header(
                HeaderName::from_static("stripe-signature"),
                axum::http::HeaderValue::from_static("t=1,v1=wrong"),
            )
            .bytes("{}".into())
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_webhook_acknowledges_verified_event() {
        let server = test_server();

        let response = server
            .post("/api/stripe-webhook")
            .add_header(
                HeaderName::from_static("stripe-signature"),
                axum::http::HeaderValue::from_static("t=1,v1=valid"),
            )
            .bytes("{}".into())
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["received"], true);
    }

    #[tokio::test]
    async fn test_webhook_missing_signature_header() {
        let server = test_server();

        let response = server.post("/api/stripe-webhook").bytes("{}".into()).await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_verify_user_roles_and_no_store() {
        let server = test_server();

        let response = server
            .post("/api/verifyUser")
            .add_header(
                HeaderName::from_static("authorization"),
                axum::http::HeaderValue::from_static("Bearer admin-token"),
            )
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.headers().get("cache-control").unwrap(),
            "no-store"
        );
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["uid"], "admin-1");
        assert_eq!(body["role"], "admin");

        let response = server
            .post("/api/verifyUser")
            .add_header(
                HeaderName::from_static("authorization"),
                axum::http::HeaderValue::from_static("Bearer valid-token"),
            )
            .await;
        let body: serde_json::Value = response.json();
        assert_eq!(body["role"], "user");
    }

    #[tokio::test]
    async fn test_verify_user_rejects_bad_token() {
        let server = test_server();

        let response = server
            .post("/api/verifyUser")
            .add_header(
                HeaderName::from_static("authorization"),
                axum::http::HeaderValue::from_static("Bearer expired"),
            )
            .await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Invalid or expired token");
    }

    #[tokio::test]
    async fn test_verify_user_rate_limited_after_window_exhausted() {
        let server = test_server();

        // 10 requests per window for this route; clients without a peer
        // address share one counter
        for _ in 0..10 {
            let response = server
                .post("/api/verifyUser")
                .add_header(
                    HeaderName::from_static("authorization"),
                    axum::http::HeaderValue::from_static("Bearer valid-token"),
                )
                .await;
            response.assert_status_ok();
        }

        let response = server
            .post("/api/verifyUser")
            .add_header(
                HeaderName::from_static("authorization"),
                axum::http::HeaderValue::from_static("Bearer valid-token"),
            )
            .await;

        assert_eq!(response.status_code(), StatusCode::TOO_MANY_REQUESTS);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Too many requests. Try again later.");
    }

    #[tokio::test]
    async fn test_checkout_rate_limited_with_its_own_message() {
        let server = test_server();

        // The limiter runs before auth, so token-less requests still
        // consume the 20-request window
        for _ in 0..20 {
            let response = server
                .post("/api/create-checkout-session")
                .json(&serde_json::json!({ "items": [] }))
                .await;
            assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        }

        let response = server
            .post("/api/create-checkout-session")
            .json(&serde_json::json!({ "items": [] }))
            .await;

        assert_eq!(response.status_code(), StatusCode::TOO_MANY_REQUESTS);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Too many requests. Slow down.");
    }
}
