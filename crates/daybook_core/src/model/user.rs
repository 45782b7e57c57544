//! User account records.

use super::calendar::Calendar;
use super::list::TaskList;
use super::{require_text, UserId, ValidationError, PASSWORD_MAX_BYTES, USERNAME_MAX_CHARS};
use serde::Serialize;

/// Public projection of one account. The password hash lives only in
/// the user repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
}

/// Session check response: the account plus its flat lists and calendars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub lists: Vec<TaskList>,
    pub calendar: Vec<Calendar>,
}

impl UserProfile {
    pub fn new(user: User, lists: Vec<TaskList>, calendar: Vec<Calendar>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            lists,
            calendar,
        }
    }
}

/// Normalizes and validates a username.
pub fn normalize_username(username: &str) -> Result<String, ValidationError> {
    let normalized = require_text(username, ValidationError::EmptyUsername)?;
    if normalized.chars().count() > USERNAME_MAX_CHARS {
        return Err(ValidationError::UsernameTooLong {
            max_chars: USERNAME_MAX_CHARS,
        });
    }
    Ok(normalized)
}

/// Rejects empty passwords and ones bcrypt cannot hash whole.
/// Whitespace is significant and kept as-is.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyPassword);
    }
    if password.len() > PASSWORD_MAX_BYTES {
        return Err(ValidationError::PasswordTooLong {
            max_bytes: PASSWORD_MAX_BYTES,
        });
    }
    Ok(())
}
