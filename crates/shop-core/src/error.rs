//! # Error Types
//!
//! Typed error handling for the shoplite backend.
//! All fallible operations return `Result<T, ShopError>`.

use thiserror::Error;

/// Core error type for the checkout pipeline and its collaborators
#[derive(Debug, Error)]
pub enum ShopError {
    /// Configuration errors (missing env vars, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed client input
    #[error("{0}")]
    Validation(String),

    /// Missing, invalid, or expired bearer token
    #[error("{0}")]
    Authentication(String),

    /// Cart item references a product absent from the catalog
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: String },

    /// Upstream service (catalog store, payment processor) returned an error
    #[error("Upstream error [{service}]: {message}")]
    Upstream { service: String, message: String },

    /// Network/HTTP failure reaching an upstream service
    #[error("Network error: {0}")]
    Network(String),

    /// Webhook signature verification failed
    #[error("Webhook verification failed: {0}")]
    WebhookVerificationFailed(String),

    /// Webhook payload parsing error
    #[error("Webhook parse error: {0}")]
    WebhookParse(String),

    /// Client exceeded the request-rate window; carries the route's
    /// rejection message
    #[error("{0}")]
    RateLimited(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ShopError {
    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ShopError::Configuration(_) => 500,
            ShopError::Validation(_) => 400,
            ShopError::Authentication(_) => 401,
            ShopError::ProductNotFound { .. } => 404,
            ShopError::Upstream { .. } => 500,
            ShopError::Network(_) => 500,
            ShopError::WebhookVerificationFailed(_) => 400,
            ShopError::WebhookParse(_) => 400,
            ShopError::RateLimited(_) => 429,
            ShopError::Serialization(_) => 500,
            ShopError::Internal(_) => 500,
        }
    }

    /// Returns true if the error originates from client input rather than
    /// an upstream or internal failure
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

/// Result type alias for shop operations
pub type ShopResult<T> = Result<T, ShopError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ShopError::Validation("Invalid items array".into()).status_code(),
            400
        );
        assert_eq!(
            ShopError::Authentication("No token provided".into()).status_code(),
            401
        );
        assert_eq!(
            ShopError::ProductNotFound {
                product_id: "p1".into()
            }
            .status_code(),
            404
        );
        assert_eq!(
            ShopError::WebhookVerificationFailed("bad signature".into()).status_code(),
            400
        );
        assert_eq!(
            ShopError::RateLimited("Too many requests. Slow down.".into()).status_code(),
            429
        );
    }

    #[test]
    fn test_upstream_failures_surface_as_500() {
        // Processor and store failures are both server-side 500s on the
        // wire; the variants differ only for logging
        assert_eq!(
            ShopError::Upstream {
                service: "stripe".into(),
                message: "boom".into()
            }
            .status_code(),
            500
        );
        assert_eq!(ShopError::Network("timeout".into()).status_code(), 500);
    }

    #[test]
    fn test_client_error_classification() {
        assert!(ShopError::Validation("x".into()).is_client_error());
        assert!(!ShopError::Upstream {
            service: "stripe".into(),
            message: "boom".into()
        }
        .is_client_error());
        assert!(!ShopError::Network("timeout".into()).is_client_error());
    }
}
