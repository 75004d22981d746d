use async_trait::async_trait;
use sessiongate_core::auth_code::AuthorizationCode;

use crate::error::ProviderError;

/// An external identity resolved from an authorization code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderIdentity {
    /// Stable username/handle; becomes the session's identity key.
    pub username: String,
}

/// Anything that can turn an authorization code into a verified identity.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve_identity(
        &self,
        code: &AuthorizationCode,
    ) -> Result<ProviderIdentity, ProviderError>;
}
