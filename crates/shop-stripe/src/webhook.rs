//! # Webhook Acknowledgment
//!
//! Dispatches signature-verified processor events. A payment-succeeded
//! event marks the order paid against the order store; every other event
//! kind is acknowledged without action so the processor does not retry
//! delivery.

use shop_core::{OrderStore, ShopResult, WebhookEvent, WebhookEventKind};
use tracing::{debug, info, warn};

/// Handle a verified webhook event.
///
/// Returning `Ok` means the caller should send the receipt acknowledgment
/// regardless of event kind.
pub async fn acknowledge(store: &dyn OrderStore, event: &WebhookEvent) -> ShopResult<()> {
    match &event.kind {
        WebhookEventKind::PaymentSucceeded => match event.order_id.as_deref() {
            Some(order_id) => {
                info!(
                    "Payment succeeded: order={}, payment={:?}",
                    order_id, event.payment_id
                );
                store.mark_paid(order_id).await
            }
            None => {
                // Sessions created outside this system carry no orderId;
                // nothing to record.
                warn!(
                    "payment_intent.succeeded without orderId metadata: event={}",
                    event.event_id
                );
                Ok(())
            }
        },
        WebhookEventKind::PaymentFailed => {
            warn!("Payment failed: payment={:?}", event.payment_id);
            Ok(())
        }
        other => {
            debug!("Acknowledged webhook without action: kind={:?}", other);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingStore {
        paid: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl OrderStore for RecordingStore {
        async fn mark_paid(&self, order_id: &str) -> ShopResult<()> {
            self.paid.lock().unwrap().push(order_id.to_string());
            Ok(())
        }
    }

    fn event(kind: WebhookEventKind, order_id: Option<&str>) -> WebhookEvent {
        WebhookEvent {
            event_id: "evt_1".into(),
            kind,
            order_id: order_id.map(String::from),
            payment_id: Some("pi_1".into()),
            raw: None,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_payment_succeeded_marks_order_paid() {
        let store = RecordingStore::default();
        let evt = event(WebhookEventKind::PaymentSucceeded, Some("order-1"));

        acknowledge(&store, &evt).await.unwrap();

        assert_eq!(*store.paid.lock().unwrap(), vec!["order-1"]);
    }

    #[tokio::test]
    async fn test_redelivered_event_is_idempotent() {
        let store = RecordingStore::default();
        let evt = event(WebhookEventKind::PaymentSucceeded, Some("order-1"));

        acknowledge(&store, &evt).await.unwrap();
        acknowledge(&store, &evt).await.unwrap();

        // The store contract makes the double mark harmless
        assert_eq!(store.paid.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_other_kinds_acknowledge_without_action() {
        let store = RecordingStore::default();

        for kind in [
            WebhookEventKind::CheckoutCompleted,
            WebhookEventKind::PaymentFailed,
            WebhookEventKind::Unknown("invoice.paid".into()),
        ] {
            acknowledge(&store, &event(kind, Some("order-1"))).await.unwrap();
        }

        assert!(store.paid.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_order_id_is_not_an_error() {
        let store = RecordingStore::default();
        let evt = event(WebhookEventKind::PaymentSucceeded, None);

        acknowledge(&store, &evt).await.unwrap();
        assert!(store.paid.lock().unwrap().is_empty());
    }
}
