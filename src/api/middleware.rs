//! API middleware
//!
//! Contains the shared application state, the handler error type and the
//! authentication gate that protects the editing pages.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use thiserror::Error;

use crate::config::SessionConfig;
use crate::db::repositories::{
    SqlxArticleRepository, SqlxCommentRepository, SqlxSessionRepository, SqlxUserRepository,
};
use crate::db::DynDatabasePool;
use crate::services::{
    ArticleService, ArticleServiceError, CommentService, CommentServiceError, SessionStore,
    UserService, UserServiceError,
};
use crate::theme::{ThemeEngine, ThemeError};

use super::session::{found, session_id};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub article_service: Arc<ArticleService>,
    pub comment_service: Arc<CommentService>,
    pub user_service: Arc<UserService>,
    pub sessions: Arc<SessionStore>,
    pub theme: Arc<ThemeEngine>,
    pub session_config: Arc<SessionConfig>,
}

impl AppState {
    /// Wire repositories and services over one pool and compile the templates
    pub fn new(pool: DynDatabasePool, session_config: &SessionConfig) -> anyhow::Result<Self> {
        let articles = SqlxArticleRepository::boxed(pool.clone());
        let comments = SqlxCommentRepository::boxed(pool.clone());
        let users = SqlxUserRepository::boxed(pool.clone());
        let session_repo = SqlxSessionRepository::boxed(pool);

        Ok(Self {
            article_service: Arc::new(ArticleService::new(articles.clone(), comments.clone())),
            comment_service: Arc::new(CommentService::new(comments, articles)),
            user_service: Arc::new(UserService::new(users)),
            sessions: Arc::new(SessionStore::new(
                session_repo,
                session_config.max_age_days,
            )),
            theme: Arc::new(ThemeEngine::new()?),
            session_config: Arc::new(session_config.clone()),
        })
    }
}

/// Error returned by handlers. Bodies are plain text.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Internal(e) => {
                tracing::error!("Request failed: {:#}", e);
                (status, "Internal server error").into_response()
            }
            other => (status, other.to_string()).into_response(),
        }
    }
}

impl From<ArticleServiceError> for ApiError {
    fn from(e: ArticleServiceError) -> Self {
        match e {
            ArticleServiceError::NotFound(_) => ApiError::NotFound("Article not found".to_string()),
            ArticleServiceError::InternalError(e) => ApiError::Internal(e),
        }
    }
}

impl From<CommentServiceError> for ApiError {
    fn from(e: CommentServiceError) -> Self {
        match e {
            CommentServiceError::ArticleNotFound(_) => {
                ApiError::NotFound("Article not found".to_string())
            }
            CommentServiceError::ValidationError(msg) => ApiError::BadRequest(msg),
            CommentServiceError::InternalError(e) => ApiError::Internal(e),
        }
    }
}

impl From<UserServiceError> for ApiError {
    fn from(e: UserServiceError) -> Self {
        match e {
            UserServiceError::InvalidCredentials => ApiError::Unauthorized(e.to_string()),
            UserServiceError::ValidationError(msg) => ApiError::BadRequest(msg),
            UserServiceError::UserExists(_) => ApiError::Conflict(e.to_string()),
            UserServiceError::InternalError(e) => ApiError::Internal(e),
        }
    }
}

impl From<ThemeError> for ApiError {
    fn from(e: ThemeError) -> Self {
        ApiError::Internal(e.into())
    }
}

/// Authentication gate.
///
/// Only a live session whose `authenticated` value is `true` gets through;
/// everyone else is sent to the login page. The session is made available
/// to the handler through request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = match session_id(request.headers(), &state.session_config.cookie_name) {
        Some(id) => match state.sessions.find(&id).await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Session lookup failed: {:#}", e);
                None
            }
        },
        None => None,
    };

    match session {
        Some(session) if session.is_authenticated() => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        _ => found("/login"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::bad_request("x").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::Internal(anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_service_errors_map_to_status() {
        let e: ApiError = UserServiceError::UserExists("alice".into()).into();
        assert_eq!(e.status(), StatusCode::CONFLICT);

        let e: ApiError = UserServiceError::InvalidCredentials.into();
        assert_eq!(e.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(e.to_string(), "Invalid username or password");

        let e: ApiError = CommentServiceError::ValidationError("empty".into()).into();
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);

        let e: ApiError = ArticleServiceError::NotFound(3).into();
        assert_eq!(e.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_internal_error_body_is_generic() {
        let response = ApiError::Internal(anyhow!("password column missing")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"Internal server error");
    }
}
