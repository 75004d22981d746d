//! Repository for the `sessions` table.

use sqlx::{FromRow, PgPool};

use crate::models::session::{SessionRow, WriteSession};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, identity, token, expires_at, created_at, updated_at";

/// Row returned by [`SessionRepo::upsert`].
#[derive(Debug, FromRow)]
pub struct UpsertedSession {
    #[sqlx(flatten)]
    pub session: SessionRow,
    /// `true` when the statement inserted a new row rather than updating.
    pub inserted: bool,
}

/// Provides CRUD operations for sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Whether a row exists for `identity`, regardless of expiry.
    pub async fn exists(pool: &PgPool, identity: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM sessions WHERE identity = $1)")
            .bind(identity)
            .fetch_one(pool)
            .await
    }

    /// Insert a new session, returning the created row.
    ///
    /// Violates `uq_sessions_identity` if a row for the identity exists.
    pub async fn create(pool: &PgPool, input: &WriteSession<'_>) -> Result<SessionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO sessions (identity, token, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SessionRow>(&query)
            .bind(input.identity)
            .bind(input.token)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Replace token and expiry for an existing identity.
    ///
    /// Returns `None` when no row matched.
    pub async fn update(
        pool: &PgPool,
        input: &WriteSession<'_>,
    ) -> Result<Option<SessionRow>, sqlx::Error> {
        let query = format!(
            "UPDATE sessions
             SET token = $2, expires_at = $3, updated_at = NOW()
             WHERE identity = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SessionRow>(&query)
            .bind(input.identity)
            .bind(input.token)
            .bind(input.expires_at)
            .fetch_optional(pool)
            .await
    }

    /// Insert or refresh the session for an identity in one statement.
    ///
    /// `xmax = 0` only holds for a freshly inserted tuple, which tells the
    /// two branches of `ON CONFLICT` apart.
    pub async fn upsert(
        pool: &PgPool,
        input: &WriteSession<'_>,
    ) -> Result<UpsertedSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO sessions (identity, token, expires_at)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT uq_sessions_identity
             DO UPDATE SET token = EXCLUDED.token,
                           expires_at = EXCLUDED.expires_at,
                           updated_at = NOW()
             RETURNING {COLUMNS}, (xmax = 0) AS inserted"
        );
        sqlx::query_as::<_, UpsertedSession>(&query)
            .bind(input.identity)
            .bind(input.token)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find an unexpired session by its bearer token.
    pub async fn find_active_by_token(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<SessionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sessions
             WHERE token = $1
               AND expires_at > NOW()"
        );
        sqlx::query_as::<_, SessionRow>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// Delete the session for an identity. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, identity: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE identity = $1")
            .bind(identity)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete the session for an identity only if it still carries `token`.
    pub async fn delete_with_token(
        pool: &PgPool,
        identity: &str,
        token: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE identity = $1 AND token = $2")
            .bind(identity)
            .bind(token)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete expired sessions. Returns the count of deleted rows.
    pub async fn delete_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
