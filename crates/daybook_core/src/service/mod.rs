//! Use-case services over the repositories.
//!
//! # Responsibility
//! - Orchestrate read-modify-write flows (load owned row, apply patch,
//!   persist) and cross-entity rules.
//! - Translate repository failures into caller-facing semantic errors.
//!
//! # Invariants
//! - Services never bypass repository ownership scoping.

use crate::model::ValidationError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod auth_service;
pub mod calendar_service;
pub mod list_service;

pub use auth_service::{
    verify_credentials, AuthError, AuthService, AuthSettings, NewAccount, SessionToken,
};
pub use calendar_service::CalendarService;
pub use list_service::ListService;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Resource-access error surfaced to API callers.
#[derive(Debug)]
pub enum ServiceError {
    Validation(ValidationError),
    /// Missing, or owned by another user.
    NotFound { entity: &'static str, id: i64 },
    Conflict(String),
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Conflict(message) => write!(f, "{message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepoError::Conflict(message) => Self::Conflict(message),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Turns an absent row into `ServiceError::NotFound`.
pub(crate) fn found<T>(value: Option<T>, entity: &'static str, id: i64) -> ServiceResult<T> {
    value.ok_or(ServiceError::NotFound { entity, id })
}
