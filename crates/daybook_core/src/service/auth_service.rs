//! Signup, login and session lifecycle.
//!
//! # Responsibility
//! - Create accounts with bcrypt-hashed passwords.
//! - Issue, resolve and revoke opaque server-side session tokens.
//!
//! # Invariants
//! - Unknown usernames and wrong passwords fail with the same error.
//! - Tokens, passwords and hashes never appear in logs or `Debug` output.
//! - bcrypt work (`NewAccount::prepare`, `verify_credentials`) never touches
//!   storage, so callers can run it without holding the connection.

use crate::model::user::{normalize_username, validate_password, User};
use crate::model::{UserId, ValidationError};
use crate::password::{hash_password, verify_password, DEFAULT_COST};
use crate::repo::session_repo::SessionRepository;
use crate::repo::user_repo::{UserCredentials, UserRepository};
use crate::repo::{now_epoch_ms, RepoError};
use bcrypt::BcryptError;
use chrono::Duration;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use uuid::Uuid;

const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 7;

#[derive(Debug)]
pub enum AuthError {
    Validation(ValidationError),
    UsernameTaken(String),
    InvalidCredentials,
    /// No session, or the session is unknown or expired.
    Unauthenticated,
    Hash(BcryptError),
    Repo(RepoError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::UsernameTaken(username) => write!(f, "username `{username}` is already taken"),
            Self::InvalidCredentials => write!(f, "invalid username or password"),
            Self::Unauthenticated => write!(f, "Unauthorized"),
            Self::Hash(err) => write!(f, "password hashing failed: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Hash(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for AuthError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<BcryptError> for AuthError {
    fn from(value: BcryptError) -> Self {
        Self::Hash(value)
    }
}

impl From<RepoError> for AuthError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Opaque session identifier carried by the client cookie.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for SessionToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Debug for SessionToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Validated signup input whose password is already hashed.
pub struct NewAccount {
    username: String,
    password_hash: String,
}

impl NewAccount {
    /// Validates the credentials and hashes the password at
    /// `settings.bcrypt_cost`.
    pub fn prepare(
        username: &str,
        password: &str,
        settings: &AuthSettings,
    ) -> Result<Self, AuthError> {
        let username = normalize_username(username)?;
        validate_password(password)?;
        let password_hash = hash_password(password, settings.bcrypt_cost)?;
        Ok(Self {
            username,
            password_hash,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl Debug for NewAccount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// Checks `password` against looked-up credentials. A missing account and a
/// wrong password both yield `InvalidCredentials`.
pub fn verify_credentials(
    credentials: Option<UserCredentials>,
    password: &str,
) -> Result<User, AuthError> {
    let Some(credentials) = credentials else {
        warn!("event=auth_login module=auth status=rejected reason=unknown_user");
        return Err(AuthError::InvalidCredentials);
    };

    if !verify_password(password, &credentials.password_hash) {
        warn!(
            "event=auth_login module=auth status=rejected reason=bad_password user_id={}",
            credentials.user.id
        );
        return Err(AuthError::InvalidCredentials);
    }
    Ok(credentials.user)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthSettings {
    pub bcrypt_cost: u32,
    /// `None` keeps sessions until logout.
    pub session_ttl: Option<Duration>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            bcrypt_cost: DEFAULT_COST,
            session_ttl: Some(Duration::hours(DEFAULT_SESSION_TTL_HOURS)),
        }
    }
}

pub struct AuthService<U: UserRepository, S: SessionRepository> {
    users: U,
    sessions: S,
    settings: AuthSettings,
}

impl<U: UserRepository, S: SessionRepository> AuthService<U, S> {
    pub fn new(users: U, sessions: S, settings: AuthSettings) -> Self {
        Self {
            users,
            sessions,
            settings,
        }
    }

    /// Creates an account and opens a session for it.
    pub fn signup(&self, username: &str, password: &str) -> Result<(User, SessionToken), AuthError> {
        let account = NewAccount::prepare(username, password, &self.settings)?;
        self.register(account)
    }

    /// Persists a prepared account and opens a session for it.
    pub fn register(&self, account: NewAccount) -> Result<(User, SessionToken), AuthError> {
        let NewAccount {
            username,
            password_hash,
        } = account;

        if self.users.find_credentials(&username)?.is_some() {
            return Err(AuthError::UsernameTaken(username));
        }

        let user = match self.users.create_user(&username, &password_hash) {
            Ok(user) => user,
            Err(RepoError::Conflict(_)) => return Err(AuthError::UsernameTaken(username)),
            Err(err) => return Err(err.into()),
        };

        let token = self.open_session(user.id)?;
        info!(
            "event=auth_signup module=auth status=ok user_id={}",
            user.id
        );
        Ok((user, token))
    }

    /// Verifies credentials and opens a new session.
    pub fn login(&self, username: &str, password: &str) -> Result<(User, SessionToken), AuthError> {
        let credentials = self.find_credentials(username)?;
        let user = verify_credentials(credentials, password)?;
        self.start_session(user)
    }

    pub fn find_credentials(&self, username: &str) -> Result<Option<UserCredentials>, AuthError> {
        Ok(self.users.find_credentials(username.trim())?)
    }

    /// Opens a session for a user whose credentials were already verified.
    pub fn start_session(&self, user: User) -> Result<(User, SessionToken), AuthError> {
        let token = self.open_session(user.id)?;
        info!("event=auth_login module=auth status=ok user_id={}", user.id);
        Ok((user, token))
    }

    /// Resolves a session token to its user.
    pub fn authenticate(&self, token: &SessionToken) -> Result<User, AuthError> {
        let user_id = self
            .sessions
            .find_active_user(token.as_str(), now_epoch_ms())?
            .ok_or(AuthError::Unauthenticated)?;
        self.users
            .get_user(user_id)?
            .ok_or(AuthError::Unauthenticated)
    }

    /// Revokes one active session. Expired sessions count as absent.
    pub fn logout(&self, token: &SessionToken) -> Result<(), AuthError> {
        let active = self
            .sessions
            .find_active_user(token.as_str(), now_epoch_ms())?;
        if active.is_none() || !self.sessions.delete_session(token.as_str())? {
            return Err(AuthError::Unauthenticated);
        }
        info!("event=auth_logout module=auth status=ok");
        Ok(())
    }

    /// Deletes the account and, by cascade, everything it owns.
    pub fn delete_account(&self, user_id: UserId) -> Result<(), AuthError> {
        match self.users.delete_user(user_id) {
            Ok(()) => {}
            Err(RepoError::NotFound { .. }) => return Err(AuthError::Unauthenticated),
            Err(err) => return Err(err.into()),
        }
        info!(
            "event=auth_delete_account module=auth status=ok user_id={}",
            user_id
        );
        Ok(())
    }

    pub fn purge_expired_sessions(&self) -> Result<usize, AuthError> {
        let removed = self.sessions.purge_expired(now_epoch_ms())?;
        if removed > 0 {
            info!(
                "event=session_purge module=auth status=ok removed={}",
                removed
            );
        }
        Ok(removed)
    }

    fn open_session(&self, user_id: UserId) -> Result<SessionToken, AuthError> {
        let token = SessionToken::generate();
        let now = now_epoch_ms();
        let expires_at = self
            .settings
            .session_ttl
            .map(|ttl| now.saturating_add(ttl.num_milliseconds()));
        self.sessions
            .create_session(token.as_str(), user_id, now, expires_at)?;
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::SessionToken;

    #[test]
    fn session_tokens_are_unique_and_redacted() {
        let first = SessionToken::generate();
        let second = SessionToken::generate();
        assert_ne!(first, second);
        assert_eq!(first.as_str().len(), 32);
        assert!(!format!("{first:?}").contains(first.as_str()));
    }
}
