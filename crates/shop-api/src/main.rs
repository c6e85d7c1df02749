//! # shoplite
//!
//! E-commerce checkout backend.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export STRIPE_SECRET_KEY=sk_test_...
//! export STRIPE_WEBHOOK_SECRET=whsec_...
//! export FRONTEND_URL=https://shop.example.com
//! export CATALOG_STORE_URL=https://catalog.internal
//! export IDENTITY_VERIFY_URL=https://identity.internal/verify
//!
//! # Run the server
//! shoplite
//! ```

use shop_api::{routes, state::AppState};
use std::net::SocketAddr;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Initialize application state; exit non-zero when mandatory
    // configuration (Stripe secrets, frontend origin, collaborator URLs)
    // is absent
    let state = match AppState::from_env() {
        Ok(state) => state,
        Err(e) => {
            error!("Missing environment variables: {}", e);
            std::process::exit(1);
        }
    };

    let addr = state.config.socket_addr();

    info!("Environment: {}", state.config.environment);
    info!("Frontend origin: {}", state.urls.origin());

    let app = routes::create_router(state);

    info!("Shoplite starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    // Connect info feeds the per-IP rate limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
