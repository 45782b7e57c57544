//! List and task endpoints. Every handler is scoped to the session user.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use daybook_core::{ListId, ListPatch, NewList, NewTask, Task, TaskId, TaskList, TaskPatch};

use crate::error::ApiError;
use crate::routes::{list_service, ApiJson, ApiPath};
use crate::session::CurrentUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/lists", get(list_lists).post(create_list))
        .route(
            "/lists/{id}",
            get(get_list).patch(update_list).delete(delete_list),
        )
        .route("/lists/{id}/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).patch(update_task).delete(delete_task),
        )
}

async fn list_lists(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<TaskList>>, ApiError> {
    let lists = state.with_conn(|conn| Ok(list_service(conn)?.list_lists(current.user.id)?))?;
    Ok(Json(lists))
}

async fn create_list(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiJson(req): ApiJson<NewList>,
) -> Result<(StatusCode, Json<TaskList>), ApiError> {
    let list =
        state.with_conn(|conn| Ok(list_service(conn)?.create_list(current.user.id, &req)?))?;
    Ok((StatusCode::CREATED, Json(list)))
}

async fn get_list(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<ListId>,
) -> Result<Json<TaskList>, ApiError> {
    let list = state.with_conn(|conn| Ok(list_service(conn)?.get_list(current.user.id, id)?))?;
    Ok(Json(list))
}

/// PATCH /lists/{id} - Rename and/or relink; `"event_id": null` unlinks
async fn update_list(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<ListId>,
    ApiJson(patch): ApiJson<ListPatch>,
) -> Result<Json<TaskList>, ApiError> {
    let list = state
        .with_conn(|conn| Ok(list_service(conn)?.update_list(current.user.id, id, &patch)?))?;
    Ok(Json(list))
}

async fn delete_list(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<ListId>,
) -> Result<StatusCode, ApiError> {
    state.with_conn(|conn| Ok(list_service(conn)?.delete_list(current.user.id, id)?))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_tasks(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(list_id): ApiPath<ListId>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks =
        state.with_conn(|conn| Ok(list_service(conn)?.list_tasks(current.user.id, list_id)?))?;
    Ok(Json(tasks))
}

async fn create_task(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(list_id): ApiPath<ListId>,
    ApiJson(req): ApiJson<NewTask>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let task = state.with_conn(|conn| {
        Ok(list_service(conn)?.create_task(current.user.id, list_id, &req)?)
    })?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn get_task(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<TaskId>,
) -> Result<Json<Task>, ApiError> {
    let task = state.with_conn(|conn| Ok(list_service(conn)?.get_task(current.user.id, id)?))?;
    Ok(Json(task))
}

async fn update_task(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<TaskId>,
    ApiJson(patch): ApiJson<TaskPatch>,
) -> Result<Json<Task>, ApiError> {
    let task = state
        .with_conn(|conn| Ok(list_service(conn)?.update_task(current.user.id, id, &patch)?))?;
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<TaskId>,
) -> Result<StatusCode, ApiError> {
    state.with_conn(|conn| Ok(list_service(conn)?.delete_task(current.user.id, id)?))?;
    Ok(StatusCode::NO_CONTENT)
}
