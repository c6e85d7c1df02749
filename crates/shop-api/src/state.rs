//! # Application State
//!
//! Shared state for the Axum application: the checkout builder, the
//! payment gateway, collaborator clients, and rate limiters.

use crate::clients::{HttpCatalogStore, HttpIdentityVerifier};
use crate::rate_limit::FixedWindowLimiter;
use shop_core::{
    CatalogCache, CheckoutBuilder, CheckoutUrls, LoggingOrderStore, SharedGateway,
    SharedIdentityVerifier, SharedOrderStore,
};
use shop_stripe::StripeGateway;
use std::sync::Arc;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Allowed frontend origin (redirect targets + CORS)
    pub frontend_url: String,
    /// Base URL of the external catalog document store
    pub catalog_store_url: String,
    /// Token-verification endpoint of the identity provider
    pub identity_verify_url: String,
    /// Environment (development, staging, production)
    pub environment: String,
}

impl AppConfig {
    /// Load from environment variables. Fails when a mandatory variable
    /// is absent so startup can exit non-zero before serving traffic.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let frontend_url = std::env::var("FRONTEND_URL")
            .map_err(|_| anyhow::anyhow!("FRONTEND_URL not set"))?;
        let catalog_store_url = std::env::var("CATALOG_STORE_URL")
            .map_err(|_| anyhow::anyhow!("CATALOG_STORE_URL not set"))?;
        let identity_verify_url = std::env::var("IDENTITY_VERIFY_URL")
            .map_err(|_| anyhow::anyhow!("IDENTITY_VERIFY_URL not set"))?;

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(4000),
            frontend_url,
            catalog_store_url,
            identity_verify_url,
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Invalid socket address")
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Checkout session builder (catalog cache + pricing + gateway)
    pub checkout: Arc<CheckoutBuilder>,
    /// Payment gateway (session verification, webhook verification)
    pub gateway: SharedGateway,
    /// Identity provider client
    pub identity: SharedIdentityVerifier,
    /// Order storage for payment acknowledgment
    pub orders: SharedOrderStore,
    /// Per-IP limiter for checkout creation
    pub checkout_limiter: Arc<FixedWindowLimiter>,
    /// Per-IP limiter for token verification
    pub verify_limiter: Arc<FixedWindowLimiter>,
    /// Redirect targets derived from the frontend origin
    pub urls: CheckoutUrls,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create state from the environment, wiring the real collaborators.
    pub fn from_env() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let gateway: SharedGateway = Arc::new(
            StripeGateway::from_env()
                .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?,
        );
        let store = Arc::new(HttpCatalogStore::new(&config.catalog_store_url)?);
        let identity: SharedIdentityVerifier =
            Arc::new(HttpIdentityVerifier::new(&config.identity_verify_url)?);

        Ok(Self::with_collaborators(
            config,
            store,
            gateway,
            identity,
            Arc::new(LoggingOrderStore),
        ))
    }

    /// Create state with explicit collaborators (tests substitute stubs
    /// here).
    pub fn with_collaborators(
        config: AppConfig,
        store: Arc<dyn shop_core::CatalogStore>,
        gateway: SharedGateway,
        identity: SharedIdentityVerifier,
        orders: SharedOrderStore,
    ) -> Self {
        let urls = CheckoutUrls::new(&config.frontend_url);
        let cache = Arc::new(CatalogCache::new(store));
        let checkout = Arc::new(CheckoutBuilder::new(cache, gateway.clone(), urls.clone()));

        Self {
            checkout,
            gateway,
            identity,
            orders,
            checkout_limiter: Arc::new(FixedWindowLimiter::new(20, Duration::from_secs(60))),
            verify_limiter: Arc::new(FixedWindowLimiter::new(10, Duration::from_secs(60))),
            urls,
            config,
        }
    }
}
