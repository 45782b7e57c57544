//! Server-side login sessions keyed by opaque cookie tokens.
//!
//! # Invariants
//! - Timestamps are epoch milliseconds; `expires_at = NULL` never expires.
//! - An expired session is deleted the first time it is looked up.

use super::{ensure_connection_ready, RepoResult};
use crate::model::UserId;
use rusqlite::{params, Connection, OptionalExtension};

pub trait SessionRepository {
    fn create_session(
        &self,
        token: &str,
        user_id: UserId,
        now_ms: i64,
        expires_at_ms: Option<i64>,
    ) -> RepoResult<()>;
    /// Resolves an unexpired token to its user.
    fn find_active_user(&self, token: &str, now_ms: i64) -> RepoResult<Option<UserId>>;
    /// Returns whether a session row was removed.
    fn delete_session(&self, token: &str) -> RepoResult<bool>;
    fn purge_expired(&self, now_ms: i64) -> RepoResult<usize>;
}

pub struct SqliteSessionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSessionRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["sessions"])?;
        Ok(Self { conn })
    }
}

impl SessionRepository for SqliteSessionRepository<'_> {
    fn create_session(
        &self,
        token: &str,
        user_id: UserId,
        now_ms: i64,
        expires_at_ms: Option<i64>,
    ) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO sessions (token, user_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![token, user_id, now_ms, expires_at_ms],
        )?;
        Ok(())
    }

    fn find_active_user(&self, token: &str, now_ms: i64) -> RepoResult<Option<UserId>> {
        let found = self
            .conn
            .query_row(
                "SELECT user_id, expires_at FROM sessions WHERE token = ?1;",
                [token],
                |row| Ok((row.get::<_, UserId>(0)?, row.get::<_, Option<i64>>(1)?)),
            )
            .optional()?;

        match found {
            Some((_, Some(expires_at))) if expires_at <= now_ms => {
                self.delete_session(token)?;
                Ok(None)
            }
            Some((user_id, _)) => Ok(Some(user_id)),
            None => Ok(None),
        }
    }

    fn delete_session(&self, token: &str) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM sessions WHERE token = ?1;", [token])?;
        Ok(changed > 0)
    }

    fn purge_expired(&self, now_ms: i64) -> RepoResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM sessions WHERE expires_at IS NOT NULL AND expires_at <= ?1;",
            [now_ms],
        )?;
        Ok(removed)
    }
}
