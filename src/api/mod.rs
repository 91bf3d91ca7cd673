//! API layer - HTTP handlers and routing
//!
//! This module contains all HTTP endpoints for the Scribe blog:
//! - Server-rendered pages (listings, article, editing forms)
//! - Plain-text article REST endpoints
//! - Registration, login and logout

pub mod articles;
pub mod auth;
pub mod common;
pub mod middleware;
pub mod pages;
pub mod session;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub use middleware::{ApiError, AppState};
pub use session::CurrentSession;

/// Build the complete router with middleware
pub fn build_router(state: AppState) -> Router {
    // Editing pages (need a signed-in session)
    let protected_routes = Router::new()
        .route(
            "/new-article",
            get(pages::new_article_form).post(pages::create_article),
        )
        .route(
            "/edit-article/{id}",
            get(pages::edit_article_form).post(pages::update_article),
        )
        .route("/delete-article/{id}", post(pages::delete_article))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Public routes
    Router::new()
        .route("/", get(pages::home))
        .route(
            "/articles",
            get(pages::articles_index).post(articles::create_article),
        )
        .route(
            "/articles/{id}",
            get(pages::show_article)
                .put(articles::update_article)
                .delete(articles::delete_article),
        )
        .route("/new-comment/{id}", post(pages::create_comment))
        .route("/register", get(auth::register_form).post(auth::register))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", get(auth::logout))
        .merge(protected_routes)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
