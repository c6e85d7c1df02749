//! # Rate Limiting
//!
//! Fixed-window request counting per client IP, applied before
//! authentication on sensitive endpoints. Excess requests are rejected
//! with a fixed error payload without invoking the pipeline at all.

use crate::handlers::ErrorBody;
use crate::state::AppState;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use shop_core::ShopError;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

struct Window {
    started_at: Instant,
    count: u32,
}

/// Fixed-window counter keyed by client address
pub struct FixedWindowLimiter {
    max_requests: u32,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

impl FixedWindowLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Record one request for `key`; returns false once the window is
    /// exhausted.
    pub fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().unwrap();

        // Expired windows are dropped wholesale, so the map only holds
        // clients seen within the current window
        windows.retain(|_, w| now.duration_since(w.started_at) < self.window);

        let window = windows.entry(key.to_string()).or_insert(Window {
            started_at: now,
            count: 0,
        });

        window.count += 1;
        window.count <= self.max_requests
    }
}

fn client_key(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

const CHECKOUT_LIMIT_MESSAGE: &str = "Too many requests. Slow down.";
const VERIFY_LIMIT_MESSAGE: &str = "Too many requests. Try again later.";

async fn enforce(
    limiter: &FixedWindowLimiter,
    message: &str,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(&request);

    if !limiter.check(&key) {
        warn!("Rate limit exceeded: client={}", key);
        let err = ShopError::RateLimited(message.to_string());
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorBody::new(err.to_string())),
        )
            .into_response();
    }

    next.run(request).await
}

/// Checkout creation limiter (20 requests per IP per minute)
pub async fn limit_checkout(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    enforce(&state.checkout_limiter, CHECKOUT_LIMIT_MESSAGE, request, next).await
}

/// Token verification limiter (10 requests per IP per minute)
pub async fn limit_verify_user(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    enforce(&state.verify_limiter, VERIFY_LIMIT_MESSAGE, request, next).await
}
