//! Article service
//!
//! Listing with pagination, lookups with comments, and the create/update/
//! delete operations shared by the HTML pages and the REST endpoints.

use crate::db::repositories::{ArticleRepository, CommentRepository};
use crate::models::{
    Article, ArticleInput, ArticleSummary, ArticleWithComments, Pagination,
};
use anyhow::Context;
use std::sync::Arc;

/// Error types for article service operations
#[derive(Debug, thiserror::Error)]
pub enum ArticleServiceError {
    /// Article not found
    #[error("Article not found: {0}")]
    NotFound(i64),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// One page of a listing plus its metadata
#[derive(Debug, Clone)]
pub struct ArticlePage {
    pub articles: Vec<ArticleSummary>,
    pub pagination: Pagination,
}

/// Article service for managing blog articles
pub struct ArticleService {
    articles: Arc<dyn ArticleRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl ArticleService {
    pub fn new(
        articles: Arc<dyn ArticleRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        Self { articles, comments }
    }

    /// Fetch page `page` (1-based) of the newest-first listing.
    ///
    /// A page beyond the last one yields no articles but valid metadata.
    pub async fn list_page(
        &self,
        page: i64,
        page_size: i64,
    ) -> Result<ArticlePage, ArticleServiceError> {
        let total = self
            .articles
            .count()
            .await
            .context("Failed to count articles")?;
        let pagination = Pagination::new(page, total, page_size);

        let articles = self
            .articles
            .list(pagination.offset(), page_size)
            .await
            .context("Failed to list articles")?;

        Ok(ArticlePage {
            articles,
            pagination,
        })
    }

    pub async fn get(&self, id: i64) -> Result<Option<Article>, ArticleServiceError> {
        Ok(self
            .articles
            .get_by_id(id)
            .await
            .context("Failed to get article")?)
    }

    /// Article plus its comments, oldest comment first
    pub async fn get_with_comments(
        &self,
        id: i64,
    ) -> Result<Option<ArticleWithComments>, ArticleServiceError> {
        let Some(article) = self.get(id).await? else {
            return Ok(None);
        };

        let comments = self
            .comments
            .list_by_article(id)
            .await
            .context("Failed to load comments")?;

        Ok(Some(ArticleWithComments { article, comments }))
    }

    pub async fn create(&self, input: &ArticleInput) -> Result<Article, ArticleServiceError> {
        let article = self
            .articles
            .create(input)
            .await
            .context("Failed to create article")?;

        tracing::info!("Created article {} by '{}'", article.id, article.author);
        Ok(article)
    }

    /// Replace title, content and author; the id is untouched
    pub async fn update(
        &self,
        id: i64,
        input: &ArticleInput,
    ) -> Result<Article, ArticleServiceError> {
        self.articles
            .update(id, input)
            .await
            .context("Failed to update article")?
            .ok_or(ArticleServiceError::NotFound(id))
    }

    /// Delete an article together with its comments
    pub async fn delete(&self, id: i64) -> Result<(), ArticleServiceError> {
        let removed = self
            .articles
            .delete(id)
            .await
            .context("Failed to delete article")?;

        if !removed {
            return Err(ArticleServiceError::NotFound(id));
        }

        tracing::info!("Deleted article {}", id);
        Ok(())
    }
}
