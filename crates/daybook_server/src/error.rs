//! API error type and its JSON rendering.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use daybook_core::{AuthError, RepoError, ServiceError};
use log::error;
use serde::Serialize;

/// Standard API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    NotFound(String),
    Unprocessable(String),
    Conflict(String),
    /// Logged in full, rendered generically.
    Internal(String),
}

impl ApiError {
    pub fn unauthorized() -> Self {
        Self::Unauthorized("Unauthorized".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Unauthorized(message)
            | Self::NotFound(message)
            | Self::Unprocessable(message)
            | Self::Conflict(message) => message,
            Self::Internal(details) => {
                error!(
                    "event=http_error module=server status=error code=500 error={}",
                    details
                );
                "internal server error".to_string()
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(err) => Self::Unprocessable(err.to_string()),
            ServiceError::NotFound { .. } => Self::NotFound(err.to_string()),
            ServiceError::Conflict(message) => Self::Conflict(message),
            ServiceError::Repo(err) => Self::Internal(err.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(_) | AuthError::UsernameTaken(_) => {
                Self::Unprocessable(err.to_string())
            }
            AuthError::InvalidCredentials => Self::Unauthorized(err.to_string()),
            AuthError::Unauthenticated => Self::unauthorized(),
            AuthError::Hash(_) | AuthError::Repo(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        ServiceError::from(err).into()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Unprocessable(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        let message = rejection.body_text();
        match rejection {
            // A malformed id names no row.
            PathRejection::FailedToDeserializePathParams(_) => Self::NotFound(message),
            _ => Self::Internal(message),
        }
    }
}
