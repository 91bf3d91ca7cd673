//! Article API endpoints
//!
//! Plain-text REST endpoints for creating, replacing and deleting articles.
//! Bodies may be JSON or urlencoded forms.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::models::ArticleInput;

use super::common::{parse_id, FormOrJson};
use super::middleware::{ApiError, AppState};

/// POST /articles
pub async fn create_article(
    State(state): State<AppState>,
    FormOrJson(input): FormOrJson<ArticleInput>,
) -> Result<impl IntoResponse, ApiError> {
    state.article_service.create(&input).await?;
    Ok((StatusCode::CREATED, "Article created successfully"))
}

/// PUT /articles/{id}
pub async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
    FormOrJson(input): FormOrJson<ArticleInput>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    state.article_service.update(id, &input).await?;
    Ok((StatusCode::OK, "Article updated successfully"))
}

/// DELETE /articles/{id}
pub async fn delete_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    state.article_service.delete(id).await?;
    Ok((StatusCode::OK, "Article deleted successfully"))
}
