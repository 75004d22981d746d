//! Session row model.

use sessiongate_core::session::Session;
use sessiongate_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub id: DbId,
    pub identity: String,
    pub token: String,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            identity: row.identity,
            token: row.token,
            expires_at: row.expires_at,
        }
    }
}

/// DTO for writing a session (create, update or upsert).
pub struct WriteSession<'a> {
    pub identity: &'a str,
    pub token: &'a str,
    pub expires_at: Timestamp,
}
