//! # Payment Gateway Trait
//!
//! Collaborator interface for the external payment processor. The
//! processor hosts the payment page, issues sessions, and emits
//! asynchronous payment-outcome events.

use crate::error::ShopResult;
use crate::order::{Order, ShippingPolicy};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A checkout session issued by the payment processor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Processor's session ID
    pub session_id: String,

    /// Our order ID
    pub order_id: String,

    /// URL the client is redirected to for payment
    pub redirect_url: String,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

/// Live payment status of a session, as reported by the processor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    /// Processor's payment status string (e.g., "paid", "unpaid")
    pub payment_status: String,
}

impl SessionStatus {
    /// True iff the processor reports the session as paid
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid"
    }
}

/// Webhook event kinds this system reacts to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventKind {
    /// Payment succeeded (triggers the mark-paid side effect)
    PaymentSucceeded,
    /// Checkout session completed
    CheckoutCompleted,
    /// Payment failed
    PaymentFailed,
    /// Any other event (acknowledged without action)
    Unknown(String),
}

/// A signature-verified webhook event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event ID from the processor
    pub event_id: String,

    /// Event kind
    pub kind: WebhookEventKind,

    /// Order identifier from event metadata (if present)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,

    /// Processor's payment identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,

    /// Raw event object (for logging/debugging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,

    /// Event timestamp
    pub timestamp: DateTime<Utc>,
}

/// External payment processor interface.
///
/// One outbound `create_session` call per checkout invocation,
/// idempotency-guarded by the order's key. No retries: a failed call
/// fails the whole request.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted checkout session and return the redirect URL.
    /// Implementations must forward `order.idempotency_key` to the
    /// processor.
    async fn create_session(
        &self,
        order: &Order,
        shipping: &ShippingPolicy,
        success_url: &str,
        cancel_url: &str,
    ) -> ShopResult<CheckoutSession>;

    /// Query the processor for a session's live payment status.
    /// Never cached; payment status must not appear more current than
    /// it is.
    async fn retrieve_session(&self, session_id: &str) -> ShopResult<SessionStatus>;

    /// Verify an inbound event's signature against the signing secret and
    /// parse it. The raw, unparsed body is required for signature
    /// computation.
    async fn verify_webhook(&self, payload: &[u8], signature: &str) -> ShopResult<WebhookEvent>;

    /// Processor name (for logging)
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared gateway (dynamic dispatch)
pub type SharedGateway = Arc<dyn PaymentGateway>;

/// Success/cancel redirect targets built from the frontend origin
#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    base_url: String,
}

impl CheckoutUrls {
    /// Create from the frontend origin; a trailing slash is trimmed
    pub fn new(frontend_url: impl Into<String>) -> Self {
        let mut base_url: String = frontend_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// Success redirect with the processor's session-id placeholder
    pub fn success_url(&self) -> String {
        format!("{}/success?session_id={{CHECKOUT_SESSION_ID}}", self.base_url)
    }

    /// Cancel redirect
    pub fn cancel_url(&self) -> String {
        format!("{}/cancel", self.base_url)
    }

    /// The frontend origin (for CORS)
    pub fn origin(&self) -> &str {
        &self.base_url
    }
}
