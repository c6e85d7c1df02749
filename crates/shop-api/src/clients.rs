//! # Collaborator Clients
//!
//! HTTP-backed implementations of the `CatalogStore` and
//! `IdentityVerifier` collaborator traits.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use shop_core::{
    AuthenticatedUser, CatalogStore, Currency, IdentityVerifier, Price, Product, ShopError,
    ShopResult,
};
use tracing::{debug, error};

fn http_client() -> ShopResult<Client> {
    Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .map_err(|e| ShopError::Configuration(format!("Failed to build HTTP client: {}", e)))
}

/// Product document as stored in the external catalog store:
/// decimal price and an `image` array.
#[derive(Debug, Deserialize)]
struct ProductDocument {
    id: String,
    name: String,
    price: f64,
    #[serde(default)]
    image: Vec<String>,
}

impl From<ProductDocument> for Product {
    fn from(doc: ProductDocument) -> Self {
        Product::new(doc.id, doc.name, Price::new(doc.price, Currency::USD))
            .with_images(doc.image)
    }
}

/// Read-only client for the external catalog document store
pub struct HttpCatalogStore {
    client: Client,
    base_url: String,
}

impl HttpCatalogStore {
    pub fn new(base_url: impl Into<String>) -> ShopResult<Self> {
        let mut base_url: String = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self {
            client: http_client()?,
            base_url,
        })
    }
}

#[async_trait]
impl CatalogStore for HttpCatalogStore {
    async fn list_products(&self) -> ShopResult<Vec<Product>> {
        let url = format!("{}/products", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ShopError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            error!("Catalog store error: status={}", status);
            return Err(ShopError::Upstream {
                service: "catalog-store".to_string(),
                message: format!("HTTP {}", status),
            });
        }

        let documents: Vec<ProductDocument> = response
            .json()
            .await
            .map_err(|e| ShopError::Serialization(format!("Invalid product documents: {}", e)))?;

        debug!("Fetched {} product documents", documents.len());
        Ok(documents.into_iter().map(Product::from).collect())
    }
}

/// Claims payload returned by the identity provider
#[derive(Debug, Deserialize)]
struct VerifiedClaims {
    uid: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    admin: bool,
}

/// Client for the external identity provider's token-verification
/// endpoint. Any failure to verify maps to 401; token contents are never
/// inspected locally.
pub struct HttpIdentityVerifier {
    client: Client,
    verify_url: String,
}

impl HttpIdentityVerifier {
    pub fn new(verify_url: impl Into<String>) -> ShopResult<Self> {
        Ok(Self {
            client: http_client()?,
            verify_url: verify_url.into(),
        })
    }
}

#[async_trait]
impl IdentityVerifier for HttpIdentityVerifier {
    async fn verify_token(&self, raw_token: &str) -> ShopResult<AuthenticatedUser> {
        let response = self
            .client
            .post(&self.verify_url)
            .json(&serde_json::json!({ "token": raw_token }))
            .send()
            .await
            .map_err(|e| {
                error!("Identity provider unreachable: {}", e);
                ShopError::Authentication("Invalid or expired token".to_string())
            })?;

        if !response.status().is_success() {
            return Err(ShopError::Authentication(
                "Invalid or expired token".to_string(),
            ));
        }

        let claims: VerifiedClaims = response.json().await.map_err(|e| {
            error!("Identity provider returned malformed claims: {}", e);
            ShopError::Authentication("Invalid or expired token".to_string())
        })?;

        Ok(AuthenticatedUser {
            uid: claims.uid,
            email: claims.email,
            admin: claims.admin,
        })
    }
}
