//! User account persistence.
//!
//! # Invariants
//! - Usernames are unique; a duplicate insert maps to `RepoError::Conflict`.
//! - Password hashes are only readable through `find_credentials`.
//! - Deleting a user cascades to sessions, lists, tasks, calendars and events.

use super::{ensure_connection_ready, RepoError, RepoResult};
use crate::model::user::User;
use crate::model::UserId;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::fmt::{Debug, Formatter};

/// A user paired with its stored bcrypt hash, for login verification.
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

impl Debug for UserCredentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserCredentials")
            .field("user", &self.user)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

pub trait UserRepository {
    fn create_user(&self, username: &str, password_hash: &str) -> RepoResult<User>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn find_credentials(&self, username: &str) -> RepoResult<Option<UserCredentials>>;
    fn delete_user(&self, id: UserId) -> RepoResult<()>;
}

pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["users"])?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, username: &str, password_hash: &str) -> RepoResult<User> {
        self.conn
            .execute(
                "INSERT INTO users (username, password_hash) VALUES (?1, ?2);",
                params![username, password_hash],
            )
            .map_err(|err| {
                RepoError::conflict_or(err, || format!("username `{username}` is already taken"))
            })?;

        Ok(User {
            id: self.conn.last_insert_rowid(),
            username: username.to_string(),
        })
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, username FROM users WHERE id = ?1;",
                [id],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }

    fn find_credentials(&self, username: &str) -> RepoResult<Option<UserCredentials>> {
        let credentials = self
            .conn
            .query_row(
                "SELECT id, username, password_hash FROM users WHERE username = ?1;",
                [username],
                |row| {
                    Ok(UserCredentials {
                        user: parse_user_row(row)?,
                        password_hash: row.get("password_hash")?,
                    })
                },
            )
            .optional()?;
        Ok(credentials)
    }

    fn delete_user(&self, id: UserId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM users WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::not_found("user", id));
        }
        Ok(())
    }
}

fn parse_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
    })
}
