//! Event persistence; ownership is resolved through the parent calendar.

use super::list_repo::{parse_list_row, LIST_SELECT_SQL};
use super::{ensure_connection_ready, RepoError, RepoResult};
use crate::model::calendar::{Event, NewEvent};
use crate::model::list::TaskList;
use crate::model::{CalendarId, EventId, UserId};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};

const EVENT_SELECT_SQL: &str = "SELECT
    events.id AS id,
    events.name AS name,
    events.date AS date,
    events.start AS start,
    events.\"end\" AS \"end\",
    events.calendar_id AS calendar_id
FROM events
INNER JOIN calendars ON calendars.id = events.calendar_id";

pub trait EventRepository {
    /// Lists events of one owned calendar in chronological order.
    fn list_events(&self, owner: UserId, calendar_id: CalendarId) -> RepoResult<Vec<Event>>;
    fn get_event(&self, owner: UserId, id: EventId) -> RepoResult<Option<Event>>;
    fn create_event(
        &self,
        owner: UserId,
        calendar_id: CalendarId,
        event: &NewEvent,
        now: NaiveDateTime,
    ) -> RepoResult<Event>;
    fn update_event(&self, owner: UserId, event: &Event) -> RepoResult<Event>;
    /// Deletes the event; linked lists keep existing with `event_id = NULL`.
    fn delete_event(&self, owner: UserId, id: EventId) -> RepoResult<()>;
    /// Lists the owner's lists linked to one event.
    fn list_linked_lists(&self, owner: UserId, id: EventId) -> RepoResult<Vec<TaskList>>;
}

pub struct SqliteEventRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEventRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["events", "calendars", "lists"])?;
        Ok(Self { conn })
    }

    fn require_event(&self, owner: UserId, id: EventId) -> RepoResult<Event> {
        self.get_event(owner, id)?
            .ok_or_else(|| RepoError::not_found("event", id))
    }
}

impl EventRepository for SqliteEventRepository<'_> {
    fn list_events(&self, owner: UserId, calendar_id: CalendarId) -> RepoResult<Vec<Event>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EVENT_SELECT_SQL}
             WHERE events.calendar_id = ?1 AND calendars.user_id = ?2
             ORDER BY events.date ASC, events.start ASC, events.id ASC;"
        ))?;
        let rows = stmt.query_map(params![calendar_id, owner], parse_event_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn get_event(&self, owner: UserId, id: EventId) -> RepoResult<Option<Event>> {
        let event = self
            .conn
            .query_row(
                &format!("{EVENT_SELECT_SQL} WHERE events.id = ?1 AND calendars.user_id = ?2;"),
                params![id, owner],
                parse_event_row,
            )
            .optional()?;
        Ok(event)
    }

    fn create_event(
        &self,
        owner: UserId,
        calendar_id: CalendarId,
        event: &NewEvent,
        now: NaiveDateTime,
    ) -> RepoResult<Event> {
        let event = event.normalized()?;

        let changed = self.conn.execute(
            "INSERT INTO events (calendar_id, name, date, start, \"end\")
             SELECT id, ?3, ?4, ?5, ?6
             FROM calendars
             WHERE id = ?1 AND user_id = ?2;",
            params![
                calendar_id,
                owner,
                event.name.as_str(),
                event.date.unwrap_or(now),
                event.start,
                event.end
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("calendar", calendar_id));
        }

        self.require_event(owner, self.conn.last_insert_rowid())
    }

    fn update_event(&self, owner: UserId, event: &Event) -> RepoResult<Event> {
        event.validate()?;

        let changed = self.conn.execute(
            "UPDATE events
             SET name = ?3, date = ?4, start = ?5, \"end\" = ?6
             WHERE id = ?1
               AND calendar_id IN (SELECT id FROM calendars WHERE user_id = ?2);",
            params![
                event.id,
                owner,
                event.name.as_str(),
                event.date,
                event.start,
                event.end
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("event", event.id));
        }

        self.require_event(owner, event.id)
    }

    fn delete_event(&self, owner: UserId, id: EventId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM events
             WHERE id = ?1
               AND calendar_id IN (SELECT id FROM calendars WHERE user_id = ?2);",
            params![id, owner],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("event", id));
        }
        Ok(())
    }

    fn list_linked_lists(&self, owner: UserId, id: EventId) -> RepoResult<Vec<TaskList>> {
        let mut stmt = self.conn.prepare(&format!(
            "{LIST_SELECT_SQL}
             WHERE lists.event_id = ?1 AND lists.user_id = ?2
             ORDER BY lists.id ASC;"
        ))?;
        let rows = stmt.query_map(params![id, owner], parse_list_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

fn parse_event_row(row: &Row<'_>) -> rusqlite::Result<Event> {
    Ok(Event {
        id: row.get("id")?,
        name: row.get("name")?,
        date: row.get("date")?,
        start: row.get("start")?,
        end: row.get("end")?,
        calendar_id: row.get("calendar_id")?,
    })
}
