pub mod auth;
pub mod calendars;
pub mod health;
pub mod lists;

use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use daybook_core::{
    AuthService, CalendarService, ListService, SqliteCalendarRepository, SqliteEventRepository,
    SqliteListRepository, SqliteSessionRepository, SqliteTaskRepository, SqliteUserRepository,
};
use log::info;
use rusqlite::Connection;
use std::time::Instant;

use crate::error::ApiError;
use crate::state::AppState;

/// JSON body extractor whose rejections render as `ApiError`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path extractor whose rejections render as `ApiError`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(lists::router())
        .merge(calendars::router())
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

pub fn auth_service<'conn>(
    conn: &'conn Connection,
    state: &AppState,
) -> Result<AuthService<SqliteUserRepository<'conn>, SqliteSessionRepository<'conn>>, ApiError> {
    Ok(AuthService::new(
        SqliteUserRepository::try_new(conn)?,
        SqliteSessionRepository::try_new(conn)?,
        state.auth,
    ))
}

pub fn list_service(
    conn: &Connection,
) -> Result<ListService<SqliteListRepository<'_>, SqliteTaskRepository<'_>>, ApiError> {
    Ok(ListService::new(
        SqliteListRepository::try_new(conn)?,
        SqliteTaskRepository::try_new(conn)?,
    ))
}

pub fn calendar_service(
    conn: &Connection,
) -> Result<CalendarService<SqliteCalendarRepository<'_>, SqliteEventRepository<'_>>, ApiError> {
    Ok(CalendarService::new(
        SqliteCalendarRepository::try_new(conn)?,
        SqliteEventRepository::try_new(conn)?,
    ))
}

/// Runs CPU-bound work such as bcrypt on the blocking pool, outside the
/// connection lock.
pub async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| ApiError::Internal(format!("blocking task failed: {err}")))?
}

async fn log_request(request: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    info!(
        "event=http_request module=server method={} path={} code={} duration_ms={}",
        method,
        path,
        response.status().as_u16(),
        started_at.elapsed().as_millis()
    );
    response
}
