//! Domain model for users, lists, tasks, calendars and events.
//!
//! # Responsibility
//! - Define the records persisted by repositories and serialized by the API.
//! - Hold field-level validation rules shared by every write path.
//!
//! # Invariants
//! - Serialized records are flat: no record embeds its owner or children,
//!   which keeps the ownership graph acyclic on the wire.
//! - Password hashes are never part of a serializable record.

use serde::{Deserialize, Deserializer};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod calendar;
pub mod list;
pub mod user;

pub type UserId = i64;
pub type ListId = i64;
pub type TaskId = i64;
pub type CalendarId = i64;
pub type EventId = i64;

pub const USERNAME_MAX_CHARS: usize = 64;
/// bcrypt only reads this many bytes of input.
pub const PASSWORD_MAX_BYTES: usize = 72;
pub const YEAR_MIN: i32 = 1;
pub const YEAR_MAX: i32 = 9999;

/// Field-level validation failures raised before any SQL mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyUsername,
    UsernameTooLong { max_chars: usize },
    EmptyPassword,
    PasswordTooLong { max_bytes: usize },
    EmptyListName,
    EmptyTaskDescription,
    InvalidTaskStatus(i64),
    EmptyEventName,
    EventEndsBeforeStart,
    YearOutOfRange(i32),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must be a non-empty string"),
            Self::UsernameTooLong { max_chars } => {
                write!(f, "username must be at most {max_chars} characters")
            }
            Self::EmptyPassword => write!(f, "password must be a non-empty string"),
            Self::PasswordTooLong { max_bytes } => {
                write!(f, "password must be at most {max_bytes} bytes")
            }
            Self::EmptyListName => write!(f, "list name must be a non-empty string"),
            Self::EmptyTaskDescription => {
                write!(f, "task description must be a non-empty string")
            }
            Self::InvalidTaskStatus(value) => {
                write!(f, "task status must be 0 or 1, got {value}")
            }
            Self::EmptyEventName => write!(f, "event name must be a non-empty string"),
            Self::EventEndsBeforeStart => write!(f, "event end must not be earlier than start"),
            Self::YearOutOfRange(year) => write!(
                f,
                "calendar year must be between {YEAR_MIN} and {YEAR_MAX}, got {year}"
            ),
        }
    }
}

impl Error for ValidationError {}

/// Trims a user-supplied text field, rejecting blank values with `err`.
pub(crate) fn require_text(value: &str, err: ValidationError) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(err);
    }
    Ok(trimmed.to_string())
}

/// Distinguishes an absent JSON field (`None`) from an explicit `null`
/// (`Some(None)`) for nullable patch fields.
pub fn deserialize_some<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
