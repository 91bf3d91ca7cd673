//! Comment service

use crate::db::repositories::{ArticleRepository, CommentRepository};
use crate::models::{Comment, CreateCommentInput};
use anyhow::Context;
use std::sync::Arc;

/// Name recorded when a comment is posted without one
pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

#[derive(Debug, thiserror::Error)]
pub enum CommentServiceError {
    #[error("Article not found: {0}")]
    ArticleNotFound(i64),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Comment service
pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    articles: Arc<dyn ArticleRepository>,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentRepository>,
        articles: Arc<dyn ArticleRepository>,
    ) -> Self {
        Self { comments, articles }
    }

    /// Attach a comment to an existing article.
    ///
    /// The article must exist, then content must not be blank. A blank
    /// author is stored as [`ANONYMOUS_AUTHOR`].
    pub async fn create(
        &self,
        article_id: i64,
        content: &str,
        author: &str,
    ) -> Result<Comment, CommentServiceError> {
        if self
            .articles
            .get_by_id(article_id)
            .await
            .context("Failed to look up article")?
            .is_none()
        {
            return Err(CommentServiceError::ArticleNotFound(article_id));
        }

        if content.trim().is_empty() {
            return Err(CommentServiceError::ValidationError(
                "Comment content is required".to_string(),
            ));
        }

        let author = match author.trim() {
            "" => ANONYMOUS_AUTHOR,
            name => name,
        };

        let comment = self
            .comments
            .create(&CreateCommentInput {
                article_id,
                content: content.to_string(),
                author: author.to_string(),
            })
            .await
            .context("Failed to create comment")?;

        tracing::debug!("Comment {} added to article {}", comment.id, article_id);
        Ok(comment)
    }
}
