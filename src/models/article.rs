//! Article model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Comment;

/// Article entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Assigned by storage, never changes afterwards
    pub id: i64,
    pub title: String,
    pub content: String,
    /// Free-text author name
    pub author: String,
    pub created_at: DateTime<Utc>,
}

/// Article row for listings, carrying its comment count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleSummary {
    #[serde(flatten)]
    pub article: Article,
    pub comment_count: i64,
}

/// Article together with its comments, oldest comment first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleWithComments {
    #[serde(flatten)]
    pub article: Article,
    pub comments: Vec<Comment>,
}

/// Input for creating or replacing an article.
///
/// Accepted both as JSON and as a urlencoded form; missing fields default to
/// empty strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: String,
}

impl ArticleInput {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            author: author.into(),
        }
    }

    /// Use `fallback` as author when none was given
    pub fn with_default_author(mut self, fallback: &str) -> Self {
        if self.author.trim().is_empty() {
            self.author = fallback.to_string();
        }
        self
    }
}
