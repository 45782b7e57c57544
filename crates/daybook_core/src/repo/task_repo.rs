//! Task persistence; ownership is resolved through the parent list.

use super::{ensure_connection_ready, RepoError, RepoResult};
use crate::model::list::{NewTask, Task, TaskStatus};
use crate::model::{ListId, TaskId, UserId};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};

const TASK_SELECT_SQL: &str = "SELECT
    tasks.id AS id,
    tasks.description AS description,
    tasks.status AS status,
    tasks.date AS date,
    tasks.updated AS updated,
    tasks.list_id AS list_id
FROM tasks
INNER JOIN lists ON lists.id = tasks.list_id";

pub trait TaskRepository {
    /// Lists tasks of one owned list, oldest first.
    fn list_tasks(&self, owner: UserId, list_id: ListId) -> RepoResult<Vec<Task>>;
    fn get_task(&self, owner: UserId, id: TaskId) -> RepoResult<Option<Task>>;
    fn create_task(
        &self,
        owner: UserId,
        list_id: ListId,
        task: &NewTask,
        now: NaiveDateTime,
    ) -> RepoResult<Task>;
    /// Persists `description`, `status` and `updated` of an owned task.
    fn update_task(&self, owner: UserId, task: &Task) -> RepoResult<Task>;
    fn delete_task(&self, owner: UserId, id: TaskId) -> RepoResult<()>;
}

pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["tasks", "lists"])?;
        Ok(Self { conn })
    }

    fn require_task(&self, owner: UserId, id: TaskId) -> RepoResult<Task> {
        self.get_task(owner, id)?
            .ok_or_else(|| RepoError::not_found("task", id))
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn list_tasks(&self, owner: UserId, list_id: ListId) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE tasks.list_id = ?1 AND lists.user_id = ?2
             ORDER BY tasks.id ASC;"
        ))?;
        let mut rows = stmt.query(params![list_id, owner])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn get_task(&self, owner: UserId, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL} WHERE tasks.id = ?1 AND lists.user_id = ?2;"
        ))?;
        let mut rows = stmt.query(params![id, owner])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn create_task(
        &self,
        owner: UserId,
        list_id: ListId,
        task: &NewTask,
        now: NaiveDateTime,
    ) -> RepoResult<Task> {
        let task = task.normalized()?;

        let changed = self.conn.execute(
            "INSERT INTO tasks (list_id, description, status, date, updated)
             SELECT id, ?3, ?4, ?5, NULL
             FROM lists
             WHERE id = ?1 AND user_id = ?2;",
            params![
                list_id,
                owner,
                task.description.as_str(),
                task.status.as_i64(),
                now
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("list", list_id));
        }

        self.require_task(owner, self.conn.last_insert_rowid())
    }

    fn update_task(&self, owner: UserId, task: &Task) -> RepoResult<Task> {
        task.validate()?;

        let changed = self.conn.execute(
            "UPDATE tasks
             SET description = ?3, status = ?4, updated = ?5
             WHERE id = ?1
               AND list_id IN (SELECT id FROM lists WHERE user_id = ?2);",
            params![
                task.id,
                owner,
                task.description.as_str(),
                task.status.as_i64(),
                task.updated
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("task", task.id));
        }

        self.require_task(owner, task.id)
    }

    fn delete_task(&self, owner: UserId, id: TaskId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM tasks
             WHERE id = ?1
               AND list_id IN (SELECT id FROM lists WHERE user_id = ?2);",
            params![id, owner],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("task", id));
        }
        Ok(())
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let status_value: i64 = row.get("status")?;
    let status = TaskStatus::try_from(status_value).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid status value `{status_value}` in tasks.status"
        ))
    })?;

    Ok(Task {
        id: row.get("id")?,
        description: row.get("description")?,
        status,
        date: row.get("date")?,
        updated: row.get("updated")?,
        list_id: row.get("list_id")?,
    })
}
