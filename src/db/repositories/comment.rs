//! Comment repository

use crate::db::{Backend, DynDatabasePool};
use crate::models::{Comment, CreateCommentInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Insert a comment and return it with its assigned id
    async fn create(&self, input: &CreateCommentInput) -> Result<Comment>;

    /// All comments of an article, oldest first
    async fn list_by_article(&self, article_id: i64) -> Result<Vec<Comment>>;
}

/// SQLx-based comment repository implementation
pub struct SqlxCommentRepository {
    pool: DynDatabasePool,
}

impl SqlxCommentRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(&self, input: &CreateCommentInput) -> Result<Comment> {
        let now = Utc::now();
        let id = match self.pool.backend() {
            Backend::Sqlite(p) => insert_comment_sqlite(p, input, now).await?,
            Backend::Mysql(p) => insert_comment_mysql(p, input, now).await?,
        };

        Ok(Comment {
            id,
            article_id: input.article_id,
            content: input.content.clone(),
            author: input.author.clone(),
            created_at: now,
        })
    }

    async fn list_by_article(&self, article_id: i64) -> Result<Vec<Comment>> {
        match self.pool.backend() {
            Backend::Sqlite(p) => list_comments_sqlite(p, article_id).await,
            Backend::Mysql(p) => list_comments_mysql(p, article_id).await,
        }
    }
}

const INSERT_SQL: &str =
    "INSERT INTO comments (article_id, content, author, created_at) VALUES (?, ?, ?, ?)";

const LIST_SQL: &str = r#"
    SELECT id, article_id, content, author, created_at
    FROM comments
    WHERE article_id = ?
    ORDER BY created_at ASC, id ASC
"#;

async fn insert_comment_sqlite(
    pool: &SqlitePool,
    input: &CreateCommentInput,
    now: chrono::DateTime<Utc>,
) -> Result<i64> {
    let result = sqlx::query(INSERT_SQL)
        .bind(input.article_id)
        .bind(&input.content)
        .bind(&input.author)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to create comment")?;

    Ok(result.last_insert_rowid())
}

async fn list_comments_sqlite(pool: &SqlitePool, article_id: i64) -> Result<Vec<Comment>> {
    let rows = sqlx::query(LIST_SQL)
        .bind(article_id)
        .fetch_all(pool)
        .await
        .context("Failed to list comments")?;

    Ok(rows
        .iter()
        .map(|row| Comment {
            id: row.get("id"),
            article_id: row.get("article_id"),
            content: row.get("content"),
            author: row.get("author"),
            created_at: row.get("created_at"),
        })
        .collect())
}

async fn insert_comment_mysql(
    pool: &MySqlPool,
    input: &CreateCommentInput,
    now: chrono::DateTime<Utc>,
) -> Result<i64> {
    let result = sqlx::query(INSERT_SQL)
        .bind(input.article_id)
        .bind(&input.content)
        .bind(&input.author)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to create comment")?;

    Ok(result.last_insert_id() as i64)
}

async fn list_comments_mysql(pool: &MySqlPool, article_id: i64) -> Result<Vec<Comment>> {
    let rows = sqlx::query(LIST_SQL)
        .bind(article_id)
        .fetch_all(pool)
        .await
        .context("Failed to list comments")?;

    Ok(rows
        .iter()
        .map(|row| Comment {
            id: row.get("id"),
            article_id: row.get("article_id"),
            content: row.get("content"),
            author: row.get("author"),
            created_at: row.get("created_at"),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{ArticleRepository, SqlxArticleRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::ArticleInput;

    async fn setup() -> (SqlxCommentRepository, i64) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let article = SqlxArticleRepository::new(pool.clone())
            .create(&ArticleInput::new("t", "c", "a"))
            .await
            .expect("Failed to create article");

        (SqlxCommentRepository::new(pool), article.id)
    }

    fn input(article_id: i64, content: &str) -> CreateCommentInput {
        CreateCommentInput {
            article_id,
            content: content.to_string(),
            author: "bob".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_list_in_order() {
        let (repo, article_id) = setup().await;

        let first = repo.create(&input(article_id, "first")).await.unwrap();
        let second = repo.create(&input(article_id, "second")).await.unwrap();

        let comments = repo.list_by_article(article_id).await.unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].id, first.id);
        assert_eq!(comments[1].id, second.id);
        assert_eq!(comments[1].content, "second");
    }

    #[tokio::test]
    async fn test_list_for_article_without_comments() {
        let (repo, article_id) = setup().await;
        assert!(repo.list_by_article(article_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_for_missing_article_fails() {
        let (repo, _) = setup().await;
        assert!(repo.create(&input(999, "orphan")).await.is_err());
    }
}
