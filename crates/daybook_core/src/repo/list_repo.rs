//! List persistence scoped by owning user.
//!
//! # Invariants
//! - Every statement filters on `lists.user_id`.
//! - A list may only link to an event whose calendar belongs to the same
//!   user; the check runs in the same statement as the write.
//! - List names are unique per user.

use super::{ensure_connection_ready, RepoError, RepoResult};
use crate::model::list::{NewList, TaskList};
use crate::model::{EventId, ListId, UserId};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub(crate) const LIST_SELECT_SQL: &str = "SELECT
    lists.id AS id,
    lists.name AS name,
    lists.date AS date,
    lists.user_id AS user_id,
    lists.event_id AS event_id
FROM lists";

/// `?1` is the owner, `?2` the (nullable) event id.
const EVENT_OWNED_BY_USER_SQL: &str = "(?2 IS NULL OR EXISTS(
    SELECT 1
    FROM events e
    INNER JOIN calendars c ON c.id = e.calendar_id
    WHERE e.id = ?2 AND c.user_id = ?1
))";

pub trait ListRepository {
    fn list_lists(&self, owner: UserId) -> RepoResult<Vec<TaskList>>;
    fn get_list(&self, owner: UserId, id: ListId) -> RepoResult<Option<TaskList>>;
    fn create_list(
        &self,
        owner: UserId,
        list: &NewList,
        now: NaiveDateTime,
    ) -> RepoResult<TaskList>;
    /// Persists `name` and `event_id` of an existing owned list.
    fn update_list(&self, owner: UserId, list: &TaskList) -> RepoResult<TaskList>;
    /// Deletes the list and, by cascade, its tasks.
    fn delete_list(&self, owner: UserId, id: ListId) -> RepoResult<()>;
}

pub struct SqliteListRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteListRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["lists", "events", "calendars"])?;
        Ok(Self { conn })
    }

    fn event_is_owned(&self, owner: UserId, event_id: Option<EventId>) -> RepoResult<bool> {
        let owned: i64 = self.conn.query_row(
            &format!("SELECT {EVENT_OWNED_BY_USER_SQL};"),
            params![owner, event_id],
            |row| row.get(0),
        )?;
        Ok(owned == 1)
    }

    fn require_list(&self, owner: UserId, id: ListId) -> RepoResult<TaskList> {
        self.get_list(owner, id)?
            .ok_or_else(|| RepoError::not_found("list", id))
    }
}

impl ListRepository for SqliteListRepository<'_> {
    fn list_lists(&self, owner: UserId) -> RepoResult<Vec<TaskList>> {
        let mut stmt = self.conn.prepare(&format!(
            "{LIST_SELECT_SQL} WHERE lists.user_id = ?1 ORDER BY lists.id ASC;"
        ))?;
        let rows = stmt.query_map([owner], parse_list_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn get_list(&self, owner: UserId, id: ListId) -> RepoResult<Option<TaskList>> {
        let list = self
            .conn
            .query_row(
                &format!("{LIST_SELECT_SQL} WHERE lists.id = ?1 AND lists.user_id = ?2;"),
                params![id, owner],
                parse_list_row,
            )
            .optional()?;
        Ok(list)
    }

    fn create_list(
        &self,
        owner: UserId,
        list: &NewList,
        now: NaiveDateTime,
    ) -> RepoResult<TaskList> {
        let list = list.normalized()?;

        let changed = self
            .conn
            .execute(
                &format!(
                    "INSERT INTO lists (user_id, event_id, name, date)
                     SELECT ?1, ?2, ?3, ?4
                     WHERE {EVENT_OWNED_BY_USER_SQL};"
                ),
                params![owner, list.event_id, list.name.as_str(), now],
            )
            .map_err(|err| duplicate_name(err, &list.name))?;

        if changed == 0 {
            return Err(RepoError::not_found("event", list.event_id.unwrap_or_default()));
        }

        self.require_list(owner, self.conn.last_insert_rowid())
    }

    fn update_list(&self, owner: UserId, list: &TaskList) -> RepoResult<TaskList> {
        list.validate()?;

        let changed = self
            .conn
            .execute(
                &format!(
                    "UPDATE lists
                     SET name = ?3, event_id = ?2
                     WHERE id = ?4 AND user_id = ?1
                       AND {EVENT_OWNED_BY_USER_SQL};"
                ),
                params![owner, list.event_id, list.name.as_str(), list.id],
            )
            .map_err(|err| duplicate_name(err, &list.name))?;

        if changed == 0 {
            // Tell a missing list apart from a foreign event.
            self.require_list(owner, list.id)?;
            if !self.event_is_owned(owner, list.event_id)? {
                return Err(RepoError::not_found(
                    "event",
                    list.event_id.unwrap_or_default(),
                ));
            }
            return Err(RepoError::not_found("list", list.id));
        }

        self.require_list(owner, list.id)
    }

    fn delete_list(&self, owner: UserId, id: ListId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM lists WHERE id = ?1 AND user_id = ?2;",
            params![id, owner],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("list", id));
        }
        Ok(())
    }
}

pub(crate) fn parse_list_row(row: &Row<'_>) -> rusqlite::Result<TaskList> {
    Ok(TaskList {
        id: row.get("id")?,
        name: row.get("name")?,
        date: row.get("date")?,
        user_id: row.get("user_id")?,
        event_id: row.get("event_id")?,
    })
}

fn duplicate_name(err: rusqlite::Error, name: &str) -> RepoError {
    RepoError::conflict_or(err, || format!("list name `{name}` already exists"))
}
