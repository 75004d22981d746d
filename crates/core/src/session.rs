//! Session model and the storage seam used by the authentication pipeline.
//!
//! A session binds a provider identity to a local bearer token with an
//! absolute expiry. There is at most one session per identity; writing a
//! session for an identity that already has one replaces its token and
//! pushes its expiry forward.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;

use crate::types::Timestamp;

/// Default session lifetime in seconds (one hour).
pub const DEFAULT_SESSION_TTL_SECS: i64 = 3600;

/// Longest accepted session lifetime in seconds (one year).
pub const MAX_SESSION_TTL_SECS: i64 = 365 * 24 * 3600;

/// Default deadline for a single store round-trip.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// An authenticated principal's active access grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Stable username/handle from the identity provider.
    pub identity: String,
    /// Opaque bearer credential.
    #[serde(skip_serializing)]
    pub token: String,
    pub expires_at: Timestamp,
}

impl Session {
    /// Build a session whose expiry is `ttl` after `now`.
    pub fn issue(identity: &str, token: &str, ttl: chrono::Duration, now: Timestamp) -> Self {
        Self {
            identity: identity.to_string(),
            token: token.to_string(),
            expires_at: expiry_after(now, ttl),
        }
    }

    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expires_at <= now
    }
}

/// `now + ttl`, saturating at the largest representable timestamp.
pub fn expiry_after(now: Timestamp, ttl: chrono::Duration) -> Timestamp {
    now.checked_add_signed(ttl)
        .unwrap_or(chrono::DateTime::<Utc>::MAX_UTC)
}

/// Whether an upsert inserted a new row or refreshed an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Refreshed,
}

impl UpsertOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            UpsertOutcome::Created => "created",
            UpsertOutcome::Refreshed => "refreshed",
        }
    }
}

/// Errors reported by a [`SessionStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The round-trip did not complete within the store deadline.
    #[error("Session store operation timed out after {0:?}")]
    Timeout(Duration),

    /// A session for the identity already exists (uniqueness violation).
    /// Losing a concurrent create is transient and safe to retry.
    #[error("Session already exists for identity '{0}'")]
    Conflict(String),

    /// An update matched no rows, e.g. the session was deleted between
    /// the existence check and the write.
    #[error("No session exists for identity '{0}'")]
    NotFound(String),

    /// Connection, protocol or query failure in the backing store.
    #[error("Session store error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Errors that a caller may resolve by retrying the whole operation.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::Timeout(_) | StoreError::Conflict(_) | StoreError::NotFound(_)
        )
    }
}

/// Durable mapping from identity to its current session.
///
/// Implementations must be safe to share across concurrent requests and must
/// bound every operation by a deadline, reporting [`StoreError::Timeout`]
/// rather than retrying.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Whether a session row exists for `identity`, expired or not.
    async fn exists(&self, identity: &str) -> Result<bool, StoreError>;

    /// Insert a new session. Fails with [`StoreError::Conflict`] if one
    /// already exists for `identity`.
    async fn create(
        &self,
        identity: &str,
        token: &str,
        ttl: chrono::Duration,
    ) -> Result<Session, StoreError>;

    /// Replace the token and expiry of an existing session. Fails with
    /// [`StoreError::NotFound`] if no row matched.
    async fn update(
        &self,
        identity: &str,
        token: &str,
        ttl: chrono::Duration,
    ) -> Result<Session, StoreError>;

    /// Atomically create or refresh the session for `identity`.
    async fn upsert(
        &self,
        identity: &str,
        token: &str,
        ttl: chrono::Duration,
    ) -> Result<(Session, UpsertOutcome), StoreError>;

    /// Remove the session for `identity`. Returns `false` when there was
    /// nothing to delete; that is not an error.
    async fn delete(&self, identity: &str) -> Result<bool, StoreError>;

    /// Remove the session for `identity` only while it still holds `token`.
    /// Returns `false` when the session was already gone or has since been
    /// refreshed with a different token.
    async fn revoke(&self, identity: &str, token: &str) -> Result<bool, StoreError>;

    /// Look up an unexpired session by its bearer token.
    async fn find_active_by_token(&self, token: &str) -> Result<Option<Session>, StoreError>;

    /// Purge every expired session, returning the number removed.
    async fn delete_expired(&self) -> Result<u64, StoreError>;

    /// Liveness check for health reporting.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(secs: i64) -> Timestamp {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn issue_sets_expiry_one_ttl_after_now() {
        let ttl = chrono::Duration::seconds(DEFAULT_SESSION_TTL_SECS);
        let session = Session::issue("alice", "tok", ttl, at(0));
        assert_eq!(session.expires_at, at(3600));
        assert_eq!(session.identity, "alice");
        assert_eq!(session.token, "tok");
    }

    #[test]
    fn oversized_ttl_saturates_instead_of_overflowing() {
        let ttl = chrono::Duration::seconds(10_000_000_000_000);
        let session = Session::issue("alice", "tok", ttl, at(0));
        assert_eq!(session.expires_at, chrono::DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let session = Session::issue("alice", "tok", chrono::Duration::seconds(10), at(0));
        assert!(!session.is_expired_at(at(9)));
        assert!(session.is_expired_at(at(10)));
        assert!(session.is_expired_at(at(11)));
    }

    #[test]
    fn token_is_not_serialized() {
        let session = Session::issue("alice", "secret-token", chrono::Duration::hours(1), at(0));
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["identity"], "alice");
        assert!(json.get("token").is_none());
        assert!(json["expires_at"].is_string());
    }

    #[test]
    fn transient_classification() {
        assert!(StoreError::Timeout(DEFAULT_STORE_TIMEOUT).is_transient());
        assert!(StoreError::Conflict("alice".into()).is_transient());
        assert!(StoreError::NotFound("alice".into()).is_transient());
        assert!(!StoreError::Backend("boom".into()).is_transient());
    }
}
