//! # Identity Verifier
//!
//! Collaborator interface for the external identity provider. The
//! provider validates bearer tokens and exposes user claims; this system
//! only derives a role from them.

use crate::error::ShopResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Claims of a verified user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// Provider-issued user id
    pub uid: String,

    /// Email address, when the provider exposes one
    #[serde(default)]
    pub email: Option<String>,

    /// Admin custom claim
    #[serde(default)]
    pub admin: bool,
}

impl AuthenticatedUser {
    /// Role derived from the admin claim
    pub fn role(&self) -> &'static str {
        if self.admin {
            "admin"
        } else {
            "user"
        }
    }
}

/// External service validating bearer tokens.
///
/// Failures map to 401; this system never inspects token contents itself.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify_token(&self, raw_token: &str) -> ShopResult<AuthenticatedUser>;
}

/// Type alias for a shared verifier
pub type SharedIdentityVerifier = Arc<dyn IdentityVerifier>;
