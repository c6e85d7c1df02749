//! # shop-stripe
//!
//! Stripe payment gateway for shoplite.
//!
//! This crate provides:
//!
//! - **StripeGateway** — Checkout Sessions API with dynamic line items,
//!   a fixed shipping option, and idempotency-guarded creation
//! - **Session retrieval** — live `payment_status` lookups
//! - **Webhook verification** — HMAC-SHA256 signature check over the raw
//!   request body, plus event dispatch via [`acknowledge`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shop_stripe::StripeGateway;
//! use shop_core::PaymentGateway;
//!
//! // Create gateway from environment
//! let gateway = StripeGateway::from_env()?;
//!
//! // Create checkout session
//! let session = gateway.create_session(
//!     &order,
//!     &ShippingPolicy::default(),
//!     "https://example.com/success?session_id={CHECKOUT_SESSION_ID}",
//!     "https://example.com/cancel",
//! ).await?;
//!
//! // Redirect user to session.redirect_url
//! ```

pub mod checkout;
pub mod config;
pub mod webhook;

// Re-exports
pub use checkout::StripeGateway;
pub use config::StripeConfig;
pub use webhook::acknowledge;
