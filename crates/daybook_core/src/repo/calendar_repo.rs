//! Calendar persistence scoped by owning user.

use super::{ensure_connection_ready, RepoError, RepoResult};
use crate::model::calendar::{Calendar, NewCalendar};
use crate::model::{CalendarId, UserId};
use rusqlite::{params, Connection, OptionalExtension, Row};

pub trait CalendarRepository {
    fn list_calendars(&self, owner: UserId) -> RepoResult<Vec<Calendar>>;
    fn get_calendar(&self, owner: UserId, id: CalendarId) -> RepoResult<Option<Calendar>>;
    fn create_calendar(&self, owner: UserId, calendar: &NewCalendar) -> RepoResult<Calendar>;
    fn update_calendar(&self, owner: UserId, calendar: &Calendar) -> RepoResult<Calendar>;
    /// Deletes the calendar and its events; lists linked to those events
    /// are detached, not deleted.
    fn delete_calendar(&self, owner: UserId, id: CalendarId) -> RepoResult<()>;
}

pub struct SqliteCalendarRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCalendarRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["calendars"])?;
        Ok(Self { conn })
    }

    fn require_calendar(&self, owner: UserId, id: CalendarId) -> RepoResult<Calendar> {
        self.get_calendar(owner, id)?
            .ok_or_else(|| RepoError::not_found("calendar", id))
    }
}

impl CalendarRepository for SqliteCalendarRepository<'_> {
    fn list_calendars(&self, owner: UserId) -> RepoResult<Vec<Calendar>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, year
             FROM calendars
             WHERE user_id = ?1
             ORDER BY year ASC, id ASC;",
        )?;
        let rows = stmt.query_map([owner], parse_calendar_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn get_calendar(&self, owner: UserId, id: CalendarId) -> RepoResult<Option<Calendar>> {
        let calendar = self
            .conn
            .query_row(
                "SELECT id, user_id, year
                 FROM calendars
                 WHERE id = ?1 AND user_id = ?2;",
                params![id, owner],
                parse_calendar_row,
            )
            .optional()?;
        Ok(calendar)
    }

    fn create_calendar(&self, owner: UserId, calendar: &NewCalendar) -> RepoResult<Calendar> {
        let calendar = calendar.normalized()?;
        self.conn.execute(
            "INSERT INTO calendars (user_id, year) VALUES (?1, ?2);",
            params![owner, calendar.year],
        )?;
        self.require_calendar(owner, self.conn.last_insert_rowid())
    }

    fn update_calendar(&self, owner: UserId, calendar: &Calendar) -> RepoResult<Calendar> {
        calendar.validate()?;
        let changed = self.conn.execute(
            "UPDATE calendars SET year = ?3 WHERE id = ?1 AND user_id = ?2;",
            params![calendar.id, owner, calendar.year],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("calendar", calendar.id));
        }
        self.require_calendar(owner, calendar.id)
    }

    fn delete_calendar(&self, owner: UserId, id: CalendarId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM calendars WHERE id = ?1 AND user_id = ?2;",
            params![id, owner],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("calendar", id));
        }
        Ok(())
    }
}

fn parse_calendar_row(row: &Row<'_>) -> rusqlite::Result<Calendar> {
    Ok(Calendar {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        year: row.get("year")?,
    })
}
