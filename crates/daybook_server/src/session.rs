//! Session cookie handling and the authenticated-user extractor.

use crate::error::ApiError;
use crate::routes::auth_service;
use crate::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use daybook_core::{SessionToken, User};

pub const SESSION_COOKIE: &str = "session_id";

/// The user behind a valid session cookie. Rejects with 401 otherwise.
#[derive(Debug)]
pub struct CurrentUser {
    pub user: User,
    pub token: SessionToken,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = session_token(&jar).ok_or_else(ApiError::unauthorized)?;
        let user = state.with_conn(|conn| Ok(auth_service(conn, state)?.authenticate(&token)?))?;
        Ok(Self { user, token })
    }
}

pub fn session_token(jar: &CookieJar) -> Option<SessionToken> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().trim())
        .filter(|value| !value.is_empty())
        .map(|value| SessionToken::from(value.to_string()))
}

/// Adds the session cookie for `token` to `jar`.
pub fn with_session(jar: CookieJar, token: SessionToken, secure: bool) -> CookieJar {
    jar.add(
        Cookie::build((SESSION_COOKIE, token.into_string()))
            .http_only(true)
            .same_site(SameSite::Lax)
            .path("/")
            .secure(secure),
    )
}

pub fn without_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}
