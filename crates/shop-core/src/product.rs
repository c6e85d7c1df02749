//! # Product Types
//!
//! Product catalog types for shoplite.
//! Products are owned by the external catalog store and read-only here.

use crate::error::{ShopError, ShopResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Supported currencies (ISO 4217) — the shop sells in the currencies of
/// its allowed shipping destinations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    USD,
    CAD,
    GBP,
    AUD,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "usd",
            Currency::CAD => "cad",
            Currency::GBP => "gbp",
            Currency::AUD => "aud",
        }
    }

    /// Convert a decimal amount to the smallest currency unit (cents)
    pub fn to_smallest_unit(&self, amount: f64) -> i64 {
        (amount * 100.0).round() as i64
    }

    /// Convert from smallest unit back to decimal
    pub fn from_smallest_unit(&self, amount: i64) -> f64 {
        amount as f64 / 100.0
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::USD
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// Price with amount in smallest currency unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in smallest currency unit (cents for USD)
    pub amount: i64,
    /// Currency
    pub currency: Currency,
}

impl Price {
    /// Create a new price from decimal amount
    pub fn new(amount: f64, currency: Currency) -> Self {
        Self {
            amount: currency.to_smallest_unit(amount),
            currency,
        }
    }

    /// Create a price from smallest unit (cents)
    pub fn from_cents(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Get the decimal amount
    pub fn as_decimal(&self) -> f64 {
        self.currency.from_smallest_unit(self.amount)
    }

    /// Format for display (e.g., "$10.00")
    pub fn display(&self) -> String {
        let symbol = match self.currency {
            Currency::USD => "$",
            Currency::CAD => "C$",
            Currency::GBP => "£",
            Currency::AUD => "A$",
        };
        format!("{}{:.2}", symbol, self.as_decimal())
    }
}

/// A product record from the external catalog store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier within the catalog
    pub id: String,

    /// Display name
    pub name: String,

    /// Base price before variant adjustments
    pub price: Price,

    /// Image URLs (first one is shown at checkout)
    #[serde(default)]
    pub images: Vec<String>,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Price) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            images: Vec::new(),
        }
    }

    /// Builder: set image URLs
    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = images;
        self
    }

    /// The primary image, if any
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(|s| s.as_str())
    }
}

/// Product mapping built from one catalog store snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductCatalog {
    products: HashMap<String, Product>,
}

impl ProductCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            products: HashMap::new(),
        }
    }

    /// Build a catalog from a store snapshot; later duplicates win,
    /// matching a wholesale document replace
    pub fn from_products(products: Vec<Product>) -> Self {
        Self {
            products: products.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }

    /// Find a product by ID
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.get(id)
    }

    /// Resolve a product or fail with the unresolved id
    pub fn resolve(&self, id: &str) -> ShopResult<&Product> {
        self.get(id).ok_or_else(|| ShopError::ProductNotFound {
            product_id: id.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Iterate over all products
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }
}

/// External document store holding the product records.
///
/// The store owns the catalog; this system only reads the full product set.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fetch the complete product set
    async fn list_products(&self) -> ShopResult<Vec<Product>>;
}
