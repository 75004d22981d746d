//! In-process [`SessionStore`] backed by a hash map.
//!
//! Used by tests and anywhere PostgreSQL is unavailable. Every operation takes a
//! single lock, so upserts are atomic in the same way the SQL statement is.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::session::{Session, SessionStore, StoreError, UpsertOutcome};

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions, including expired ones.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Fetch the stored row for `identity` regardless of expiry.
    pub async fn get(&self, identity: &str) -> Option<Session> {
        self.sessions.read().await.get(identity).cloned()
    }

    /// Insert a row verbatim, bypassing expiry computation.
    pub async fn insert_raw(&self, session: Session) {
        self.sessions
            .write()
            .await
            .insert(session.identity.clone(), session);
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn exists(&self, identity: &str) -> Result<bool, StoreError> {
        Ok(self.sessions.read().await.contains_key(identity))
    }

    async fn create(
        &self,
        identity: &str,
        token: &str,
        ttl: chrono::Duration,
    ) -> Result<Session, StoreError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(identity) {
            return Err(StoreError::Conflict(identity.to_string()));
        }
        let session = Session::issue(identity, token, ttl, Utc::now());
        sessions.insert(identity.to_string(), session.clone());
        Ok(session)
    }

    async fn update(
        &self,
        identity: &str,
        token: &str,
        ttl: chrono::Duration,
    ) -> Result<Session, StoreError> {
        let mut sessions = self.sessions.write().await;
        let slot = sessions
            .get_mut(identity)
            .ok_or_else(|| StoreError::NotFound(identity.to_string()))?;
        *slot = Session::issue(identity, token, ttl, Utc::now());
        Ok(slot.clone())
    }

    async fn upsert(
        &self,
        identity: &str,
        token: &str,
        ttl: chrono::Duration,
    ) -> Result<(Session, UpsertOutcome), StoreError> {
        let session = Session::issue(identity, token, ttl, Utc::now());
        let previous = self
            .sessions
            .write()
            .await
            .insert(identity.to_string(), session.clone());
        let outcome = match previous {
            Some(_) => UpsertOutcome::Refreshed,
            None => UpsertOutcome::Created,
        };
        Ok((session, outcome))
    }

    async fn delete(&self, identity: &str) -> Result<bool, StoreError> {
        Ok(self.sessions.write().await.remove(identity).is_some())
    }

    async fn revoke(&self, identity: &str, token: &str) -> Result<bool, StoreError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get(identity) {
            Some(session) if session.token == token => {
                sessions.remove(identity);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_active_by_token(&self, token: &str) -> Result<Option<Session>, StoreError> {
        let now = Utc::now();
        Ok(self
            .sessions
            .read()
            .await
            .values()
            .find(|s| s.token == token && !s.is_expired_at(now))
            .cloned())
    }

    async fn delete_expired(&self) -> Result<u64, StoreError> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired_at(now));
        Ok((before - sessions.len()) as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
