//! Calendar and event endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use daybook_core::{
    Calendar, CalendarId, CalendarPatch, Event, EventId, EventPatch, NewCalendar, NewEvent,
    TaskList,
};

use crate::error::ApiError;
use crate::routes::{calendar_service, ApiJson, ApiPath};
use crate::session::CurrentUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/calendars", get(list_calendars).post(create_calendar))
        .route(
            "/calendars/{id}",
            get(get_calendar)
                .patch(update_calendar)
                .delete(delete_calendar),
        )
        .route(
            "/calendars/{id}/events",
            get(list_events).post(create_event),
        )
        .route(
            "/events/{id}",
            get(get_event).patch(update_event).delete(delete_event),
        )
        .route("/events/{id}/lists", get(event_lists))
}

async fn list_calendars(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<Calendar>>, ApiError> {
    let calendars =
        state.with_conn(|conn| Ok(calendar_service(conn)?.list_calendars(current.user.id)?))?;
    Ok(Json(calendars))
}

async fn create_calendar(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiJson(req): ApiJson<NewCalendar>,
) -> Result<(StatusCode, Json<Calendar>), ApiError> {
    let calendar = state
        .with_conn(|conn| Ok(calendar_service(conn)?.create_calendar(current.user.id, &req)?))?;
    Ok((StatusCode::CREATED, Json(calendar)))
}

async fn get_calendar(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<CalendarId>,
) -> Result<Json<Calendar>, ApiError> {
    let calendar =
        state.with_conn(|conn| Ok(calendar_service(conn)?.get_calendar(current.user.id, id)?))?;
    Ok(Json(calendar))
}

async fn update_calendar(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<CalendarId>,
    ApiJson(patch): ApiJson<CalendarPatch>,
) -> Result<Json<Calendar>, ApiError> {
    let calendar = state.with_conn(|conn| {
        Ok(calendar_service(conn)?.update_calendar(current.user.id, id, &patch)?)
    })?;
    Ok(Json(calendar))
}

/// DELETE /calendars/{id} - Removes the calendar and its events; linked
/// lists survive unlinked
async fn delete_calendar(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<CalendarId>,
) -> Result<StatusCode, ApiError> {
    state.with_conn(|conn| Ok(calendar_service(conn)?.delete_calendar(current.user.id, id)?))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_events(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(calendar_id): ApiPath<CalendarId>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let events = state.with_conn(|conn| {
        Ok(calendar_service(conn)?.list_events(current.user.id, calendar_id)?)
    })?;
    Ok(Json(events))
}

async fn create_event(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(calendar_id): ApiPath<CalendarId>,
    ApiJson(req): ApiJson<NewEvent>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let event = state.with_conn(|conn| {
        Ok(calendar_service(conn)?.create_event(current.user.id, calendar_id, &req)?)
    })?;
    Ok((StatusCode::CREATED, Json(event)))
}

async fn get_event(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<EventId>,
) -> Result<Json<Event>, ApiError> {
    let event =
        state.with_conn(|conn| Ok(calendar_service(conn)?.get_event(current.user.id, id)?))?;
    Ok(Json(event))
}

async fn update_event(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<EventId>,
    ApiJson(patch): ApiJson<EventPatch>,
) -> Result<Json<Event>, ApiError> {
    let event = state.with_conn(|conn| {
        Ok(calendar_service(conn)?.update_event(current.user.id, id, &patch)?)
    })?;
    Ok(Json(event))
}

async fn delete_event(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<EventId>,
) -> Result<StatusCode, ApiError> {
    state.with_conn(|conn| Ok(calendar_service(conn)?.delete_event(current.user.id, id)?))?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /events/{id}/lists - Lists linked to one event
async fn event_lists(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<EventId>,
) -> Result<Json<Vec<TaskList>>, ApiError> {
    let lists =
        state.with_conn(|conn| Ok(calendar_service(conn)?.event_lists(current.user.id, id)?))?;
    Ok(Json(lists))
}
