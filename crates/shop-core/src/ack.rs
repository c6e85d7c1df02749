//! # Order Acknowledgment
//!
//! Collaborator interface for recording successful payments. The webhook
//! handler calls `mark_paid` when the processor reports a payment
//! succeeded; implementations must be idempotent since the processor may
//! deliver the same event more than once.

use crate::error::ShopResult;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// External order storage. `mark_paid` must be idempotent.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn mark_paid(&self, order_id: &str) -> ShopResult<()>;
}

/// Type alias for a shared order store
pub type SharedOrderStore = Arc<dyn OrderStore>;

/// Log-only order store. Durable recording of payment confirmation is an
/// extension point; until a real store is wired in, a successful payment
/// is acknowledged but not durably recorded.
pub struct LoggingOrderStore;

#[async_trait]
impl OrderStore for LoggingOrderStore {
    async fn mark_paid(&self, order_id: &str) -> ShopResult<()> {
        info!("Order {} paid successfully", order_id);
        Ok(())
    }
}
