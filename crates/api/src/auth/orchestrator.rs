//! The callback pipeline: validate the authorization code, resolve the
//! provider identity, then create or refresh the local session.
//!
//! ```text
//! Start -> ValidateInput -> ExchangeIdentity -> UpsertSession -> Respond
//!              |                  |                  |
//!              +------------------+------------------+--> Error
//! ```
//!
//! The session write is a single atomic upsert keyed on identity, so two
//! concurrent logins for the same user cannot race into a duplicate-key
//! failure or a lost update.

use std::sync::Arc;

use sessiongate_core::auth_code::AuthorizationCode;
use sessiongate_core::error::CoreError;
use sessiongate_core::session::{Session, SessionStore, StoreError, UpsertOutcome};
use sessiongate_core::token::generate_session_token;
use sessiongate_oauth::{IdentityProvider, ProviderError};

/// Lifetime and shape of issued sessions.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub ttl: chrono::Duration,
    pub token_length: usize,
}

/// Pipeline step at which a request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStep {
    ValidateInput,
    ExchangeIdentity,
    UpsertSession,
}

/// Failure of a single authentication attempt.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    InvalidInput(#[from] CoreError),

    #[error("Identity provider failure: {0}")]
    Provider(#[from] ProviderError),

    #[error("Session store failure: {0}")]
    Store(#[from] StoreError),
}

impl AuthError {
    pub fn step(&self) -> AuthStep {
        match self {
            AuthError::InvalidInput(_) => AuthStep::ValidateInput,
            AuthError::Provider(_) => AuthStep::ExchangeIdentity,
            AuthError::Store(_) => AuthStep::UpsertSession,
        }
    }
}

/// A session written by a successful authentication.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub session: Session,
    pub outcome: UpsertOutcome,
}

/// Runs the callback pipeline against a provider and a store.
///
/// Holds no mutable state; one instance is shared by every request.
pub struct Authenticator {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn SessionStore>,
    settings: SessionSettings,
}

impl Authenticator {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn SessionStore>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            provider,
            store,
            settings,
        }
    }

    /// Authenticate a raw `code` query value.
    ///
    /// Nothing is sent to the provider unless the code is well formed, and
    /// nothing is written to the store unless the provider returned an
    /// identity.
    #[tracing::instrument(skip_all)]
    pub async fn authenticate(&self, raw_code: Option<&str>) -> Result<IssuedSession, AuthError> {
        let code = AuthorizationCode::parse(raw_code)?;

        let identity = self.provider.resolve_identity(&code).await?;
        tracing::debug!(identity = %identity.username, "Provider identity resolved");

        let token = generate_session_token(self.settings.token_length);
        let (session, outcome) = self
            .store
            .upsert(&identity.username, &token, self.settings.ttl)
            .await?;

        tracing::info!(
            identity = %session.identity,
            outcome = outcome.as_str(),
            expires_at = %session.expires_at,
            "Session issued"
        );

        Ok(IssuedSession { session, outcome })
    }
}
