//! HTML pages
//!
//! Server-rendered listing, article and editing pages. The editing routes
//! sit behind the auth gate; reading and commenting are open to everyone.

use axum::{
    extract::{Path, Query, State},
    response::{Html, Response},
};
use serde::Deserialize;
use tera::Context as TeraContext;

use crate::models::{ArticleInput, PAGE_SIZE};
use crate::theme::View;

use super::common::{parse_id, FormOrJson, PageQuery};
use super::middleware::{ApiError, AppState};
use super::session::{found, CurrentSession};

/// Comment form posted from the article page
#[derive(Debug, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub content: String,
}

/// Base context shared by every page
fn page_context(session: &CurrentSession) -> TeraContext {
    let mut ctx = TeraContext::new();
    if let Some(username) = session.username() {
        ctx.insert("current_user", username);
    }
    ctx
}

fn render(state: &AppState, view: View, ctx: &TeraContext) -> Result<Html<String>, ApiError> {
    Ok(Html(state.theme.render(view, ctx)?))
}

/// GET /
pub async fn home(
    State(state): State<AppState>,
    session: CurrentSession,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, ApiError> {
    let page = state
        .article_service
        .list_page(query.page(), PAGE_SIZE)
        .await?;

    let mut ctx = page_context(&session);
    ctx.insert("articles", &page.articles);
    ctx.insert("pagination", &page.pagination);
    ctx.insert("has_previous", &page.pagination.has_previous());
    ctx.insert("has_next", &page.pagination.has_next());

    render(&state, View::Home, &ctx)
}

/// GET /articles
pub async fn articles_index(
    State(state): State<AppState>,
    session: CurrentSession,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, ApiError> {
    let page_size = query.page_size();
    let page = state
        .article_service
        .list_page(query.page(), page_size)
        .await?;
    let pagination = page.pagination;

    let mut ctx = page_context(&session);
    ctx.insert("articles", &page.articles);
    ctx.insert("total_count", &pagination.total_records);
    ctx.insert("current_page", &pagination.current_page);
    ctx.insert("page_size", &page_size);
    ctx.insert("has_previous", &pagination.has_previous());
    ctx.insert("has_next", &pagination.has_next());

    render(&state, View::Articles, &ctx)
}

/// GET /articles/{id}
pub async fn show_article(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(id): Path<String>,
) -> Result<Html<String>, ApiError> {
    let id = parse_id(&id)?;
    let article = state
        .article_service
        .get_with_comments(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Article not found"))?;

    let mut ctx = page_context(&session);
    ctx.insert("article", &article);

    render(&state, View::Article, &ctx)
}

/// GET /new-article
pub async fn new_article_form(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<Html<String>, ApiError> {
    render(&state, View::NewArticle, &page_context(&session))
}

/// POST /new-article
pub async fn create_article(
    State(state): State<AppState>,
    session: CurrentSession,
    FormOrJson(input): FormOrJson<ArticleInput>,
) -> Result<Response, ApiError> {
    let input = match session.username() {
        Some(username) => input.with_default_author(username),
        None => input,
    };
    state.article_service.create(&input).await?;
    Ok(found("/"))
}

/// GET /edit-article/{id}
pub async fn edit_article_form(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(id): Path<String>,
) -> Result<Html<String>, ApiError> {
    let id = parse_id(&id)?;
    let article = state
        .article_service
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Article not found"))?;

    let mut ctx = page_context(&session);
    ctx.insert("article", &article);

    render(&state, View::EditArticle, &ctx)
}

/// POST /edit-article/{id}
pub async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
    FormOrJson(input): FormOrJson<ArticleInput>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    state.article_service.update(id, &input).await?;
    Ok(found(&format!("/articles/{}", id)))
}

/// POST /delete-article/{id}
pub async fn delete_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    state.article_service.delete(id).await?;
    Ok(found("/"))
}

/// POST /new-comment/{id}
pub async fn create_comment(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(id): Path<String>,
    FormOrJson(form): FormOrJson<CommentForm>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let author = match (form.author.trim(), session.username()) {
        ("", Some(username)) => username.to_string(),
        (author, _) => author.to_string(),
    };

    state
        .comment_service
        .create(id, &form.content, &author)
        .await?;

    Ok(found(&format!("/articles/{}", id)))
}
