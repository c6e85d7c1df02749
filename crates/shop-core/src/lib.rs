//! # shop-core
//!
//! Core types and the pricing/checkout pipeline for shoplite.
//!
//! This crate provides:
//! - `unit_price` for variant-adjusted pricing
//! - `CatalogCache` with a TTL over the external `CatalogStore`
//! - `CheckoutBuilder` assembling idempotency-guarded processor sessions
//! - `PaymentGateway`, `IdentityVerifier`, and `OrderStore` collaborator
//!   traits
//! - `ShopError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use shop_core::{CatalogCache, CheckoutBuilder, CheckoutUrls, CartItem};
//!
//! let cache = Arc::new(CatalogCache::new(store));
//! let builder = CheckoutBuilder::new(cache, gateway, CheckoutUrls::new(frontend_url));
//!
//! let session = builder
//!     .build_session(Some(vec![CartItem::new("p1", 2)]), &user.uid)
//!     .await?;
//!
//! // Redirect user to session.redirect_url
//! ```

pub mod ack;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod gateway;
pub mod identity;
pub mod order;
pub mod pricing;
pub mod product;

// Re-exports for convenience
pub use ack::{LoggingOrderStore, OrderStore, SharedOrderStore};
pub use cart::CartItem;
pub use catalog::{CatalogCache, FRESHNESS_WINDOW};
pub use checkout::CheckoutBuilder;
pub use error::{ShopError, ShopResult};
pub use gateway::{
    CheckoutSession, CheckoutUrls, PaymentGateway, SessionStatus, SharedGateway, WebhookEvent,
    WebhookEventKind,
};
pub use identity::{AuthenticatedUser, IdentityVerifier, SharedIdentityVerifier};
pub use order::{LineItem, Order, ShippingPolicy, SALES_TAX_CENTS, SALES_TAX_NAME};
pub use pricing::unit_price;
pub use product::{CatalogStore, Currency, Price, Product, ProductCatalog};
