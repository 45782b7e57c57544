//! Account and session endpoints

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::CookieJar;
use daybook_core::{verify_credentials, NewAccount, User, UserProfile};
use serde::Deserialize;

use crate::error::ApiError;
use crate::routes::{auth_service, blocking, calendar_service, list_service, ApiJson};
use crate::session::{session_token, with_session, without_session, CurrentUser};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/check_session", get(check_session))
        .route("/logout", delete(logout))
        .route("/account", delete(delete_account))
}

/// Request body for signup and login. Missing fields are treated as empty.
#[derive(Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl CredentialsRequest {
    fn into_parts(self) -> (String, String) {
        (
            self.username.unwrap_or_default(),
            self.password.unwrap_or_default(),
        )
    }
}

/// POST /signup - Create an account and log it in
async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(req): ApiJson<CredentialsRequest>,
) -> Result<(StatusCode, CookieJar, Json<User>), ApiError> {
    let (username, password) = req.into_parts();
    let settings = state.auth;
    let account =
        blocking(move || Ok(NewAccount::prepare(&username, &password, &settings)?)).await?;
    let (user, token) =
        state.with_conn(|conn| Ok(auth_service(conn, &state)?.register(account)?))?;

    Ok((
        StatusCode::CREATED,
        with_session(jar, token, state.cookie_secure),
        Json(user),
    ))
}

/// POST /login - Verify credentials and start a session
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(req): ApiJson<CredentialsRequest>,
) -> Result<(CookieJar, Json<User>), ApiError> {
    let (username, password) = req.into_parts();
    let credentials =
        state.with_conn(|conn| Ok(auth_service(conn, &state)?.find_credentials(&username)?))?;
    let user = blocking(move || Ok(verify_credentials(credentials, &password)?)).await?;
    let (user, token) =
        state.with_conn(|conn| Ok(auth_service(conn, &state)?.start_session(user)?))?;

    Ok((with_session(jar, token, state.cookie_secure), Json(user)))
}

/// GET /check_session - Current user with their lists and calendars
async fn check_session(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<UserProfile>, ApiError> {
    let owner = current.user.id;
    let profile = state.with_conn(|conn| {
        let lists = list_service(conn)?.list_lists(owner)?;
        let calendars = calendar_service(conn)?.list_calendars(owner)?;
        Ok(UserProfile::new(current.user, lists, calendars))
    })?;
    Ok(Json(profile))
}

/// DELETE /logout - End the current session
async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(StatusCode, CookieJar), ApiError> {
    let token = session_token(&jar).ok_or_else(ApiError::unauthorized)?;
    state.with_conn(|conn| Ok(auth_service(conn, &state)?.logout(&token)?))?;
    Ok((StatusCode::NO_CONTENT, without_session(jar)))
}

/// DELETE /account - Delete the current user and everything they own
async fn delete_account(
    State(state): State<AppState>,
    current: CurrentUser,
    jar: CookieJar,
) -> Result<(StatusCode, CookieJar), ApiError> {
    state.with_conn(|conn| Ok(auth_service(conn, &state)?.delete_account(current.user.id)?))?;
    Ok((StatusCode::NO_CONTENT, without_session(jar)))
}
