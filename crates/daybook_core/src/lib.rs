//! Core domain logic for daybook: storage, ownership-scoped repositories,
//! and the account/session/list/calendar use-cases built on them.

pub mod db;
pub mod logging;
pub mod model;
pub mod password;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::calendar::{Calendar, CalendarPatch, Event, EventPatch, NewCalendar, NewEvent};
pub use model::list::{ListPatch, NewList, NewTask, Task, TaskList, TaskPatch, TaskStatus};
pub use model::user::{User, UserProfile};
pub use model::{CalendarId, EventId, ListId, TaskId, UserId, ValidationError};
pub use repo::calendar_repo::{CalendarRepository, SqliteCalendarRepository};
pub use repo::event_repo::{EventRepository, SqliteEventRepository};
pub use repo::list_repo::{ListRepository, SqliteListRepository};
pub use repo::session_repo::{SessionRepository, SqliteSessionRepository};
pub use repo::task_repo::{SqliteTaskRepository, TaskRepository};
pub use repo::user_repo::{SqliteUserRepository, UserCredentials, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::{
    verify_credentials, AuthError, AuthService, AuthSettings, CalendarService, ListService,
    NewAccount, ServiceError, ServiceResult, SessionToken,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
