//! # Request Handlers
//!
//! Axum request handlers for the shoplite API. All errors are converted
//! to a JSON `{error}` body at this boundary; nothing crashes the
//! process, and upstream details are logged server-side only.

use crate::auth::bearer_token;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use shop_core::{AuthenticatedUser, CartItem, ShopError};
use shop_stripe::acknowledge;
use tracing::{error, info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Checkout creation response
#[derive(Debug, Serialize)]
pub struct CheckoutUrlResponse {
    /// Processor-hosted payment page to redirect the client to
    pub url: String,
}

/// Query parameters for session verification
#[derive(Debug, Deserialize)]
pub struct VerifySessionQuery {
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
}

/// Session verification response
#[derive(Debug, Serialize)]
pub struct VerifySessionResponse {
    pub paid: bool,
}

/// `ShopError` wrapper carrying the HTTP conversion
pub struct ApiError(ShopError);

impl From<ShopError> for ApiError {
    fn from(err: ShopError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.status_code();
        if self.0.is_client_error() {
            warn!("Request failed: {}", self.0);
        } else {
            error!("Request failed: {}", self.0);
        }
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorBody::new(self.0.to_string()))).into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "shoplite",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Create a checkout session for the authenticated user's cart.
///
/// The body is taken as loose JSON so a missing or non-array `items`
/// field yields the same `Invalid items array` response instead of a
/// deserializer-shaped rejection.
#[instrument(skip(state, payload), fields(uid = %user.uid))]
pub async fn create_checkout_session(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<CheckoutUrlResponse>, ApiError> {
    let items: Option<Vec<CartItem>> = match payload.get("items") {
        Some(value) if value.is_array() => Some(
            serde_json::from_value(value.clone())
                .map_err(|_| ShopError::Validation("Invalid items array".to_string()))?,
        ),
        Some(_) => {
            return Err(ShopError::Validation("Invalid items array".to_string()).into());
        }
        None => None,
    };

    let session = state.checkout.build_session(items, &user.uid).await?;

    info!("Created checkout session: {}", session.session_id);

    Ok(Json(CheckoutUrlResponse {
        url: session.redirect_url,
    }))
}

/// Report whether a checkout session has been paid. Always a live
/// processor query; payment status is never cached.
#[instrument(skip(state, _user))]
pub async fn verify_checkout_session(
    State(state): State<AppState>,
    Extension(_user): Extension<AuthenticatedUser>,
    Query(query): Query<VerifySessionQuery>,
) -> Result<Json<VerifySessionResponse>, ApiError> {
    let session_id = query
        .session_id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ShopError::Validation("Missing session ID".to_string()))?;

    let status = state.gateway.retrieve_session(&session_id).await?;

    Ok(Json(VerifySessionResponse {
        paid: status.is_paid(),
    }))
}

/// Handle a processor webhook. The raw body bytes are required for
/// signature computation and must not pass through a JSON layer first.
#[instrument(skip(state, headers, body))]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            ShopError::WebhookVerificationFailed("Missing Stripe-Signature header".to_string())
        })?;

    let event = state.gateway.verify_webhook(&body, signature).await?;

    info!("Received webhook: kind={:?}, id={}", event.kind, event.event_id);

    acknowledge(state.orders.as_ref(), &event).await?;

    // Receipt acknowledgment for every verified event so the processor
    // does not retry delivery
    Ok(Json(serde_json::json!({ "received": true })))
}

/// Verify a bearer token and return the user's claims and role. Performs
/// its own token extraction since the response shape differs from the
/// auth middleware's pass-through.
#[instrument(skip(state, headers))]
pub async fn verify_user(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let token = match bearer_token(&headers) {
        Some(token) => token.to_string(),
        None => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(ErrorBody::new("No token provided")),
            )
                .into_response();
        }
    };

    match state.identity.verify_token(&token).await {
        Ok(user) => {
            let mut response = Json(serde_json::json!({
                "success": true,
                "uid": user.uid,
                "email": user.email,
                "role": user.role(),
            }))
            .into_response();
            // Never cache identity responses
            response
                .headers_mut()
                .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
            response
        }
        Err(e) => {
            warn!("Token verification failed: {}", e);
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorBody::new("Invalid or expired token")),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_shape() {
        let body = ErrorBody::new("Missing session ID");
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"error":"Missing session ID"}"#);
    }

    #[test]
    fn test_api_error_status_mapping() {
        let err: ApiError = ShopError::Validation("Invalid items array".to_string()).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let err: ApiError = ShopError::ProductNotFound {
            product_id: "p9".into(),
        }
        .into();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
