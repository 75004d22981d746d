//! [`SessionStore`] backed by PostgreSQL.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sessiongate_core::session::{
    expiry_after, Session, SessionStore, StoreError, UpsertOutcome,
};

use crate::models::session::WriteSession;
use crate::repositories::SessionRepo;
use crate::DbPool;

/// PostgreSQL unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Session store over a shared connection pool.
///
/// Every round-trip is raced against `timeout`. Dropping the returned future
/// (request cancelled, server shutting down) drops the in-flight query and
/// returns its connection to the pool.
#[derive(Debug, Clone)]
pub struct PgSessionStore {
    pool: DbPool,
    timeout: Duration,
}

impl PgSessionStore {
    pub fn new(pool: DbPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    async fn with_deadline<T>(
        &self,
        identity: Option<&str>,
        fut: impl Future<Output = Result<T, sqlx::Error>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(|e| classify(e, identity)),
            Err(_) => {
                tracing::warn!(timeout = ?self.timeout, "Session store deadline exceeded");
                Err(StoreError::Timeout(self.timeout))
            }
        }
    }
}

/// Map a sqlx error onto the store taxonomy.
///
/// Unique violations only become [`StoreError::Conflict`] for writes keyed
/// on an identity.
fn classify(err: sqlx::Error, identity: Option<&str>) -> StoreError {
    if let (sqlx::Error::Database(db_err), Some(identity)) = (&err, identity) {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return StoreError::Conflict(identity.to_string());
        }
    }
    StoreError::Backend(Box::new(err))
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn exists(&self, identity: &str) -> Result<bool, StoreError> {
        self.with_deadline(Some(identity), SessionRepo::exists(&self.pool, identity))
            .await
    }

    async fn create(
        &self,
        identity: &str,
        token: &str,
        ttl: chrono::Duration,
    ) -> Result<Session, StoreError> {
        let input = WriteSession {
            identity,
            token,
            expires_at: expiry_after(Utc::now(), ttl),
        };
        let row = self
            .with_deadline(Some(identity), SessionRepo::create(&self.pool, &input))
            .await?;
        Ok(row.into())
    }

    async fn update(
        &self,
        identity: &str,
        token: &str,
        ttl: chrono::Duration,
    ) -> Result<Session, StoreError> {
        let input = WriteSession {
            identity,
            token,
            expires_at: expiry_after(Utc::now(), ttl),
        };
        self.with_deadline(Some(identity), SessionRepo::update(&self.pool, &input))
            .await?
            .map(Session::from)
            .ok_or_else(|| StoreError::NotFound(identity.to_string()))
    }

    async fn upsert(
        &self,
        identity: &str,
        token: &str,
        ttl: chrono::Duration,
    ) -> Result<(Session, UpsertOutcome), StoreError> {
        let input = WriteSession {
            identity,
            token,
            expires_at: expiry_after(Utc::now(), ttl),
        };
        let row = self
            .with_deadline(Some(identity), SessionRepo::upsert(&self.pool, &input))
            .await?;
        let outcome = if row.inserted {
            UpsertOutcome::Created
        } else {
            UpsertOutcome::Refreshed
        };
        Ok((row.session.into(), outcome))
    }

    async fn delete(&self, identity: &str) -> Result<bool, StoreError> {
        self.with_deadline(Some(identity), SessionRepo::delete(&self.pool, identity))
            .await
    }

    async fn revoke(&self, identity: &str, token: &str) -> Result<bool, StoreError> {
        self.with_deadline(
            Some(identity),
            SessionRepo::delete_with_token(&self.pool, identity, token),
        )
        .await
    }

    async fn find_active_by_token(&self, token: &str) -> Result<Option<Session>, StoreError> {
        let row = self
            .with_deadline(None, SessionRepo::find_active_by_token(&self.pool, token))
            .await?;
        Ok(row.map(Session::from))
    }

    async fn delete_expired(&self) -> Result<u64, StoreError> {
        self.with_deadline(None, SessionRepo::delete_expired(&self.pool))
            .await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.with_deadline(None, crate::health_check(&self.pool)).await
    }
}
