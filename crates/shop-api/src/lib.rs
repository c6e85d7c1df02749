//! # shop-api
//!
//! HTTP API layer for shoplite.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Bearer-token auth and per-IP rate limiting middleware
//! - HTTP clients for the catalog store and identity provider
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/create-checkout-session` | Create checkout session |
//! | GET | `/api/verify-checkout-session` | Check session paid status |
//! | POST | `/api/stripe-webhook` | Stripe webhook |
//! | POST | `/api/verifyUser` | Verify bearer token, return role |

pub mod auth;
pub mod clients;
pub mod handlers;
pub mod rate_limit;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
