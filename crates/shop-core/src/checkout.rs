//! # Checkout Session Builder
//!
//! Assembles a payment-processor session request from cart items, catalog
//! data (via the cache), computed prices, and the fixed shipping/tax
//! policy, then submits it with an idempotency token.

use crate::cart::CartItem;
use crate::catalog::CatalogCache;
use crate::error::{ShopError, ShopResult};
use crate::gateway::{CheckoutSession, CheckoutUrls, SharedGateway};
use crate::order::{LineItem, Order, ShippingPolicy};
use crate::pricing::unit_price;
use crate::product::Currency;
use std::sync::Arc;
use tracing::{info, instrument};

/// Builds and submits checkout sessions.
///
/// Owns the catalog cache and the gateway so tests can substitute fakes
/// and control time.
pub struct CheckoutBuilder {
    catalog: Arc<CatalogCache>,
    gateway: SharedGateway,
    urls: CheckoutUrls,
    shipping: ShippingPolicy,
}

impl CheckoutBuilder {
    pub fn new(catalog: Arc<CatalogCache>, gateway: SharedGateway, urls: CheckoutUrls) -> Self {
        Self {
            catalog,
            gateway,
            urls,
            shipping: ShippingPolicy::default(),
        }
    }

    /// Builder: override the shipping policy
    pub fn with_shipping(mut self, shipping: ShippingPolicy) -> Self {
        self.shipping = shipping;
        self
    }

    /// Build a session for the given cart and submit it to the processor.
    ///
    /// Fails with `Validation` when `items` is absent and `ProductNotFound`
    /// when any item references an unknown product id; no session is
    /// created in either case. Every successful session carries exactly
    /// one Sales Tax line and one shipping option, empty carts included.
    #[instrument(skip(self, items), fields(uid = %user_id))]
    pub async fn build_session(
        &self,
        items: Option<Vec<CartItem>>,
        user_id: &str,
    ) -> ShopResult<CheckoutSession> {
        let items =
            items.ok_or_else(|| ShopError::Validation("Invalid items array".to_string()))?;

        let catalog = self.catalog.fetch().await?;

        let mut order = Order::new(Currency::USD).with_metadata("uid", user_id);

        for item in &items {
            let product = catalog.resolve(&item.id)?;
            let price = unit_price(item, product);
            order.add_item(
                LineItem::new(&product.name, price, item.quantity)
                    .with_images(product.images.clone()),
            );
        }

        order.add_item(LineItem::sales_tax(order.currency));

        info!(
            "Creating checkout session: order={}, {} line items, total={}",
            order.id,
            order.line_items.len(),
            order.total().display()
        );

        self.gateway
            .create_session(
                &order,
                &self.shipping,
                &self.urls.success_url(),
                &self.urls.cancel_url(),
            )
            .await
    }
}
