//! Session cookie plumbing
//!
//! Reading the session id out of the `Cookie` header, writing it back with
//! `Set-Cookie`, and the [`CurrentSession`] extractor used by pages that
//! behave differently for signed-in readers.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::convert::Infallible;

use crate::models::Session;

use super::middleware::AppState;

/// Find the value of cookie `name` in the request headers
pub fn session_id(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value carrying the session id
pub fn session_cookie(name: &str, id: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        name, id, max_age_secs
    )
}

/// `302 Found` redirect
pub fn found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
        Err(_) => {
            tracing::error!("Invalid redirect target: {}", location);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// `302 Found` redirect that also (re)sets the session cookie
pub fn found_with_cookie(location: &str, cookie: &str) -> Response {
    let mut response = found(location);
    match HeaderValue::from_str(cookie) {
        Ok(cookie) => {
            response.headers_mut().insert(header::SET_COOKIE, cookie);
        }
        Err(_) => tracing::error!("Invalid session cookie value"),
    }
    response
}

/// The caller's live session, if any.
///
/// Behind the auth gate the session is taken from request extensions;
/// elsewhere it is looked up from the cookie. Lookup failures are treated
/// as "no session".
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Option<Session>);

impl CurrentSession {
    /// Username of the signed-in caller
    pub fn username(&self) -> Option<&str> {
        self.0
            .as_ref()
            .filter(|s| s.is_authenticated())
            .and_then(|s| s.username())
            .filter(|name| !name.is_empty())
    }
}

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Session>() {
            return Ok(CurrentSession(Some(session.clone())));
        }

        let Some(id) = session_id(&parts.headers, &state.session_config.cookie_name) else {
            return Ok(CurrentSession(None));
        };

        match state.sessions.find(&id).await {
            Ok(session) => Ok(CurrentSession(session)),
            Err(e) => {
                tracing::warn!("Session lookup failed: {:#}", e);
                Ok(CurrentSession(None))
            }
        }
    }
}
