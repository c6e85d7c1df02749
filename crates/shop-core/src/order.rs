//! # Order Types
//!
//! Priced line items, the transient order assembled for one checkout call,
//! and the fixed tax/shipping policy.

use crate::product::{Currency, Price};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Fixed "Sales Tax" line amount in cents (policy constant, not computed
/// from a tax table — a known simplification)
pub const SALES_TAX_CENTS: i64 = 3732;

/// Display name of the tax line item
pub const SALES_TAX_NAME: &str = "Sales Tax";

/// A priced line item in an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Display name (denormalized from the product)
    pub name: String,

    /// Unit price; the processor applies quantity itself
    pub unit_price: Price,

    /// Quantity
    pub quantity: u32,

    /// Image URLs shown at checkout
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

impl LineItem {
    pub fn new(name: impl Into<String>, unit_price: Price, quantity: u32) -> Self {
        Self {
            name: name.into(),
            unit_price,
            quantity,
            images: Vec::new(),
        }
    }

    /// Builder: set image URLs
    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = images;
        self
    }

    /// The fixed Sales Tax line appended to every session
    pub fn sales_tax(currency: Currency) -> Self {
        Self::new(SALES_TAX_NAME, Price::from_cents(SALES_TAX_CENTS, currency), 1)
    }

    /// Conceptual line total (unit price × quantity)
    pub fn total(&self) -> Price {
        Price::from_cents(
            self.unit_price.amount * self.quantity as i64,
            self.unit_price.currency,
        )
    }
}

/// Fixed shipping option attached to every session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingPolicy {
    /// Shipping cost in smallest currency unit
    pub amount: i64,
    pub currency: Currency,
    /// Carrier label shown at checkout
    pub display_name: String,
    /// Carrier estimate window, in business days
    pub min_business_days: u32,
    pub max_business_days: u32,
    /// Destination allow-list (ISO 3166-1 alpha-2)
    pub allowed_countries: Vec<String>,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            amount: 1500,
            currency: Currency::USD,
            display_name: "Standard Shipping".to_string(),
            min_business_days: 3,
            max_business_days: 5,
            allowed_countries: vec!["US".into(), "CA".into(), "GB".into(), "AU".into()],
        }
    }
}

/// An order assembled for one checkout call. Not persisted; it exists only
/// for the duration of the payment-processor request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Order identifier correlating the session to downstream payment
    /// confirmation. UUID v4, collision-resistant across concurrent
    /// requests.
    pub id: String,

    /// Ordered sequence of priced line items (tax line included)
    pub line_items: Vec<LineItem>,

    /// Currency (same for all items)
    pub currency: Currency,

    /// Idempotency token supplied to the processor so client retries of
    /// the same logical checkout do not create duplicate charges
    pub idempotency_key: String,

    /// Metadata correlating the session to the order (order id, user id)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Create an empty order with a generated id; the idempotency token is
    /// derived from the order id so retries of the same logical checkout
    /// present the same key.
    pub fn new(currency: Currency) -> Self {
        let id = format!("order-{}", Uuid::new_v4());
        let mut metadata = HashMap::new();
        metadata.insert("orderId".to_string(), id.clone());

        Self {
            idempotency_key: id.clone(),
            id,
            line_items: Vec::new(),
            currency,
            metadata,
            created_at: Utc::now(),
        }
    }

    /// Add a line item
    pub fn add_item(&mut self, item: LineItem) {
        self.line_items.push(item);
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Order total across all line items
    pub fn total(&self) -> Price {
        let amount: i64 = self.line_items.iter().map(|item| item.total().amount).sum();
        Price::from_cents(amount, self.currency)
    }

    pub fn is_empty(&self) -> bool {
        self.line_items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_item_total() {
        let item = LineItem::new("Phone", Price::from_cents(75_000, Currency::USD), 2);
        assert_eq!(item.total().amount, 150_000);
    }

    #[test]
    fn test_sales_tax_line() {
        let tax = LineItem::sales_tax(Currency::USD);
        assert_eq!(tax.name, "Sales Tax");
        assert_eq!(tax.unit_price.amount, 3732);
        assert_eq!(tax.quantity, 1);
    }

    #[test]
    fn test_shipping_policy_defaults() {
        let policy = ShippingPolicy::default();
        assert_eq!(policy.amount, 1500);
        assert_eq!(policy.min_business_days, 3);
        assert_eq!(policy.max_business_days, 5);
        assert_eq!(policy.allowed_countries, vec!["US", "CA", "GB", "AU"]);
    }

    #[test]
    fn test_order_ids_are_unique() {
        let a = Order::new(Currency::USD);
        let b = Order::new(Currency::USD);

        assert_ne!(a.id, b.id);
        assert_eq!(a.idempotency_key, a.id);
        assert_eq!(a.metadata.get("orderId"), Some(&a.id));
    }

    #[test]
    fn test_order_total() {
        let mut order = Order::new(Currency::USD);
        order.add_item(LineItem::new("A", Price::from_cents(1000, Currency::USD), 2));
        order.add_item(LineItem::sales_tax(Currency::USD));

        assert_eq!(order.total().amount, 2000 + 3732);
    }
}
