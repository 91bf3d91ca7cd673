//! Authentication API endpoints
//!
//! Registration, login and logout. Login state lives in the server-side
//! session; the cookie only carries the session id.

use axum::{
    extract::State,
    http::HeaderMap,
    response::{Html, Response},
};
use tera::Context as TeraContext;

use crate::services::{LoginInput, RegisterInput};
use crate::theme::View;

use super::common::FormOrJson;
use super::middleware::{ApiError, AppState};
use super::session::{found, found_with_cookie, session_cookie, session_id};

/// GET /register
pub async fn register_form(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    Ok(Html(state.theme.render(View::Register, &TeraContext::new())?))
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    FormOrJson(input): FormOrJson<RegisterInput>,
) -> Result<Response, ApiError> {
    state.user_service.register(input).await?;
    Ok(found("/"))
}

/// GET /login
pub async fn login_form(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    Ok(Html(state.theme.render(View::Login, &TeraContext::new())?))
}

/// POST /login
///
/// Every successful login gets a new session id; a session the caller
/// already held is discarded.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    FormOrJson(input): FormOrJson<LoginInput>,
) -> Result<Response, ApiError> {
    let user = state.user_service.authenticate(&input).await?;

    let cookie_name = &state.session_config.cookie_name;
    let mut session = state
        .sessions
        .start(session_id(&headers, cookie_name).as_deref())
        .await?;
    session.log_in(&user.username);
    state.sessions.save(&mut session).await?;

    tracing::info!("User '{}' logged in", user.username);

    let cookie = session_cookie(
        cookie_name,
        &session.id,
        state.sessions.max_age().num_seconds(),
    );
    Ok(found_with_cookie("/", &cookie))
}

/// GET /logout
///
/// A live session is kept and marked unauthenticated. Without one there is
/// nothing to record, so nothing is stored.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let cookie_name = &state.session_config.cookie_name;
    let Some(id) = session_id(&headers, cookie_name) else {
        return Ok(found("/"));
    };
    let Some(mut session) = state.sessions.find(&id).await? else {
        return Ok(found("/"));
    };

    if let Some(username) = session.username() {
        tracing::info!("User '{}' logged out", username);
    }
    session.log_out();
    state.sessions.save(&mut session).await?;

    let cookie = session_cookie(
        cookie_name,
        &session.id,
        state.sessions.max_age().num_seconds(),
    );
    Ok(found_with_cookie("/", &cookie))
}
