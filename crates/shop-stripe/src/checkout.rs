//! # Stripe Checkout Sessions
//!
//! Stripe implementation of the `PaymentGateway` collaborator: hosted
//! Checkout Sessions, live session retrieval, and webhook signature
//! verification.

use crate::config::StripeConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use shop_core::{
    CheckoutSession, Order, PaymentGateway, SessionStatus, ShippingPolicy, ShopError, ShopResult,
    WebhookEvent, WebhookEventKind,
};
use tracing::{debug, error, info, instrument};

/// Stripe payment gateway
///
/// Uses Stripe's hosted checkout page for secure payments.
/// This is the recommended approach for PCI compliance.
pub struct StripeGateway {
    config: StripeConfig,
    client: Client,
}

impl StripeGateway {
    /// Create a new Stripe gateway
    pub fn new(config: StripeConfig) -> ShopResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| ShopError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> ShopResult<Self> {
        let config = StripeConfig::from_env()?;
        Self::new(config)
    }

    /// Build the form-encoded body for the Checkout Sessions API
    fn build_form_params(
        order: &Order,
        shipping: &ShippingPolicy,
        success_url: &str,
        cancel_url: &str,
    ) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            ("success_url".to_string(), success_url.to_string()),
            ("cancel_url".to_string(), cancel_url.to_string()),
        ];

        for (i, item) in order.line_items.iter().enumerate() {
            params.push((
                format!("line_items[{}][price_data][currency]", i),
                item.unit_price.currency.as_str().to_string(),
            ));
            params.push((
                format!("line_items[{}][price_data][unit_amount]", i),
                item.unit_price.amount.to_string(),
            ));
            params.push((
                format!("line_items[{}][price_data][product_data][name]", i),
                item.name.clone(),
            ));
            for (j, img) in item.images.iter().enumerate() {
                params.push((
                    format!("line_items[{}][price_data][product_data][images][{}]", i, j),
                    img.clone(),
                ));
            }
            params.push((
                format!("line_items[{}][quantity]", i),
                item.quantity.to_string(),
            ));
        }

        // One fixed shipping option per session
        params.push((
            "shipping_options[0][shipping_rate_data][type]".to_string(),
            "fixed_amount".to_string(),
        ));
        params.push((
            "shipping_options[0][shipping_rate_data][fixed_amount][amount]".to_string(),
            shipping.amount.to_string(),
        ));
        params.push((
            "shipping_options[0][shipping_rate_data][fixed_amount][currency]".to_string(),
            shipping.currency.as_str().to_string(),
        ));
        params.push((
            "shipping_options[0][shipping_rate_data][display_name]".to_string(),
            shipping.display_name.clone(),
        ));
        params.push((
            "shipping_options[0][shipping_rate_data][delivery_estimate][minimum][unit]".to_string(),
            "business_day".to_string(),
        ));
        params.push((
            "shipping_options[0][shipping_rate_data][delivery_estimate][minimum][value]".to_string(),
            shipping.min_business_days.to_string(),
        ));
        params.push((
            "shipping_options[0][shipping_rate_data][delivery_estimate][maximum][unit]".to_string(),
            "business_day".to_string(),
        ));
        params.push((
            "shipping_options[0][shipping_rate_data][delivery_estimate][maximum][value]".to_string(),
            shipping.max_business_days.to_string(),
        ));
        for (i, country) in shipping.allowed_countries.iter().enumerate() {
            params.push((
                format!("shipping_address_collection[allowed_countries][{}]", i),
                country.clone(),
            ));
        }

        for (key, value) in &order.metadata {
            params.push((format!("metadata[{}]", key), value.clone()));
        }

        params
    }

    fn upstream_error(status: reqwest::StatusCode, body: &str) -> ShopError {
        error!("Stripe API error: status={}, body={}", status, body);

        if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(body) {
            return ShopError::Upstream {
                service: "stripe".to_string(),
                message: error_response.error.message,
            };
        }

        ShopError::Upstream {
            service: "stripe".to_string(),
            message: format!("HTTP {}", status),
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    #[instrument(skip(self, order, shipping), fields(order_id = %order.id))]
    async fn create_session(
        &self,
        order: &Order,
        shipping: &ShippingPolicy,
        success_url: &str,
        cancel_url: &str,
    ) -> ShopResult<CheckoutSession> {
        let params = Self::build_form_params(order, shipping, success_url, cancel_url);

        debug!(
            "Creating Stripe checkout session: {} line items",
            order.line_items.len()
        );

        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .header("Idempotency-Key", &order.idempotency_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| ShopError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ShopError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(Self::upstream_error(status, &body));
        }

        let session: StripeSessionResponse = serde_json::from_str(&body).map_err(|e| {
            ShopError::Serialization(format!("Failed to parse Stripe response: {}", e))
        })?;

        info!(
            "Created Stripe checkout session: id={}, order={}",
            session.id, order.id
        );

        Ok(CheckoutSession {
            session_id: session.id,
            order_id: order.id.clone(),
            redirect_url: session.url,
            created_at: Utc::now(),
        })
    }

    #[instrument(skip(self))]
    async fn retrieve_session(&self, session_id: &str) -> ShopResult<SessionStatus> {
        let url = format!(
            "{}/v1/checkout/sessions/{}",
            self.config.api_base_url, session_id
        );

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .send()
            .await
            .map_err(|e| ShopError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ShopError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(Self::upstream_error(status, &body));
        }

        let session: StripeSessionStatusResponse = serde_json::from_str(&body).map_err(|e| {
            ShopError::Serialization(format!("Failed to parse Stripe response: {}", e))
        })?;

        Ok(SessionStatus {
            payment_status: session.payment_status,
        })
    }

    #[instrument(skip(self, payload, signature))]
    async fn verify_webhook(&self, payload: &[u8], signature: &str) -> ShopResult<WebhookEvent> {
        let sig_parts = parse_signature_header(signature)?;

        // Reject replayed events: timestamp must be within tolerance
        let now = Utc::now().timestamp();
        if (now - sig_parts.timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
            return Err(ShopError::WebhookVerificationFailed(
                "Timestamp outside tolerance".to_string(),
            ));
        }

        let signed_payload = format!(
            "{}.{}",
            sig_parts.timestamp,
            String::from_utf8_lossy(payload)
        );
        let expected_sig = compute_hmac_sha256(&self.config.webhook_secret, &signed_payload);

        let valid = sig_parts
            .signatures
            .iter()
            .any(|sig| constant_time_compare(sig, &expected_sig));

        if !valid {
            return Err(ShopError::WebhookVerificationFailed(
                "Signature mismatch".to_string(),
            ));
        }

        let event: StripeWebhookEvent = serde_json::from_slice(payload)
            .map_err(|e| ShopError::WebhookParse(format!("Failed to parse webhook: {}", e)))?;

        debug!("Verified Stripe webhook: type={}", event.event_type);

        let kind = match event.event_type.as_str() {
            "payment_intent.succeeded" => WebhookEventKind::PaymentSucceeded,
            "checkout.session.completed" => WebhookEventKind::CheckoutCompleted,
            "payment_intent.payment_failed" => WebhookEventKind::PaymentFailed,
            other => WebhookEventKind::Unknown(other.to_string()),
        };

        let order_id = event
            .data
            .object
            .get("metadata")
            .and_then(|m| m.get("orderId"))
            .and_then(|v| v.as_str())
            .map(String::from);

        let payment_id = event
            .data
            .object
            .get("id")
            .and_then(|v| v.as_str())
            .map(String::from);

        Ok(WebhookEvent {
            event_id: event.id,
            kind,
            order_id,
            payment_id,
            raw: Some(serde_json::Value::Object(event.data.object)),
            timestamp: DateTime::from_timestamp(event.created, 0).unwrap_or_else(Utc::now),
        })
    }

    fn provider_name(&self) -> &'static str {
        "stripe"
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeSessionResponse {
    id: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct StripeSessionStatusResponse {
    #[serde(default = "unknown_status")]
    payment_status: String,
}

fn unknown_status() -> String {
    "unknown".to_string()
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct StripeWebhookEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    created: i64,
    data: StripeEventData,
}

#[derive(Debug, Deserialize)]
struct StripeEventData {
    object: serde_json::Map<String, serde_json::Value>,
}

// =============================================================================
// Webhook Signature Verification
// =============================================================================

/// Maximum age of a webhook signature timestamp (5 minutes)
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

fn parse_signature_header(header: &str) -> ShopResult<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let kv: Vec<&str> = part.split('=').collect();
        if kv.len() != 2 {
            continue;
        }
        match kv[0] {
            "t" => {
                timestamp = kv[1].parse().ok();
            }
            "v1" => {
                signatures.push(kv[1].to_string());
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        ShopError::WebhookVerificationFailed("Missing timestamp in signature".to_string())
    })?;

    if signatures.is_empty() {
        return Err(ShopError::WebhookVerificationFailed(
            "No v1 signature found".to_string(),
        ));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

pub(crate) fn compute_hmac_sha256(secret: &str, message: &str) -> String {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    let result = mac.finalize();
    hex::encode(result.into_bytes())
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}
