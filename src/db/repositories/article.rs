//! Article repository
//!
//! Database operations for articles. Listings carry a per-article comment
//! count computed in the same query.

use crate::db::{Backend, DynDatabasePool};
use crate::models::{Article, ArticleInput, ArticleSummary};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Article repository trait
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Insert a new article and return it with its assigned id
    async fn create(&self, input: &ArticleInput) -> Result<Article>;

    /// Get article by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Article>>;

    /// One page of articles, newest first, with comment counts
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<ArticleSummary>>;

    /// Total number of articles
    async fn count(&self) -> Result<i64>;

    /// Replace title, content and author. Returns `None` if the article
    /// does not exist.
    async fn update(&self, id: i64, input: &ArticleInput) -> Result<Option<Article>>;

    /// Delete an article and all of its comments. Returns whether a row
    /// was removed.
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based article repository implementation
pub struct SqlxArticleRepository {
    pool: DynDatabasePool,
}

impl SqlxArticleRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ArticleRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ArticleRepository for SqlxArticleRepository {
    async fn create(&self, input: &ArticleInput) -> Result<Article> {
        match self.pool.backend() {
            Backend::Sqlite(p) => create_article_sqlite(p, input).await,
            Backend::Mysql(p) => create_article_mysql(p, input).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Article>> {
        match self.pool.backend() {
            Backend::Sqlite(p) => get_article_by_id_sqlite(p, id).await,
            Backend::Mysql(p) => get_article_by_id_mysql(p, id).await,
        }
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<ArticleSummary>> {
        match self.pool.backend() {
            Backend::Sqlite(p) => list_articles_sqlite(p, offset, limit).await,
            Backend::Mysql(p) => list_articles_mysql(p, offset, limit).await,
        }
    }

    async fn count(&self) -> Result<i64> {
        match self.pool.backend() {
            Backend::Sqlite(p) => count_articles_sqlite(p).await,
            Backend::Mysql(p) => count_articles_mysql(p).await,
        }
    }

    async fn update(&self, id: i64, input: &ArticleInput) -> Result<Option<Article>> {
        match self.pool.backend() {
            Backend::Sqlite(p) => update_article_sqlite(p, id, input).await,
            Backend::Mysql(p) => update_article_mysql(p, id, input).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        match self.pool.backend() {
            Backend::Sqlite(p) => delete_article_sqlite(p, id).await,
            Backend::Mysql(p) => delete_article_mysql(p, id).await,
        }
    }
}

const LIST_SQL: &str = r#"
    SELECT a.id, a.title, a.content, a.author, a.created_at,
           (SELECT COUNT(*) FROM comments c WHERE c.article_id = a.id) AS comment_count
    FROM articles a
    ORDER BY a.created_at DESC, a.id DESC
    LIMIT ? OFFSET ?
"#;

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_article_sqlite(pool: &SqlitePool, input: &ArticleInput) -> Result<Article> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO articles (title, content, author, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&input.title)
    .bind(&input.content)
    .bind(&input.author)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create article")?;

    Ok(Article {
        id: result.last_insert_rowid(),
        title: input.title.clone(),
        content: input.content.clone(),
        author: input.author.clone(),
        created_at: now,
    })
}

async fn get_article_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Article>> {
    let row = sqlx::query(
        "SELECT id, title, content, author, created_at FROM articles WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get article by ID")?;

    Ok(row.as_ref().map(row_to_article_sqlite))
}

async fn list_articles_sqlite(
    pool: &SqlitePool,
    offset: i64,
    limit: i64,
) -> Result<Vec<ArticleSummary>> {
    let rows = sqlx::query(LIST_SQL)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list articles")?;

    Ok(rows
        .iter()
        .map(|row| ArticleSummary {
            article: row_to_article_sqlite(row),
            comment_count: row.get("comment_count"),
        })
        .collect())
}

async fn count_articles_sqlite(pool: &SqlitePool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM articles")
        .fetch_one(pool)
        .await
        .context("Failed to count articles")?;

    Ok(row.get("count"))
}

async fn update_article_sqlite(
    pool: &SqlitePool,
    id: i64,
    input: &ArticleInput,
) -> Result<Option<Article>> {
    let result = sqlx::query("UPDATE articles SET title = ?, content = ?, author = ? WHERE id = ?")
        .bind(&input.title)
        .bind(&input.content)
        .bind(&input.author)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update article")?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_article_by_id_sqlite(pool, id).await
}

async fn delete_article_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    sqlx::query("DELETE FROM comments WHERE article_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete article comments")?;

    let result = sqlx::query("DELETE FROM articles WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete article")?;

    tx.commit().await.context("Failed to commit article delete")?;

    Ok(result.rows_affected() > 0)
}

fn row_to_article_sqlite(row: &sqlx::sqlite::SqliteRow) -> Article {
    Article {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        author: row.get("author"),
        created_at: row.get("created_at"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_article_mysql(pool: &MySqlPool, input: &ArticleInput) -> Result<Article> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO articles (title, content, author, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&input.title)
    .bind(&input.content)
    .bind(&input.author)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create article")?;

    Ok(Article {
        id: result.last_insert_id() as i64,
        title: input.title.clone(),
        content: input.content.clone(),
        author: input.author.clone(),
        created_at: now,
    })
}

async fn get_article_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Article>> {
    let row = sqlx::query(
        "SELECT id, title, content, author, created_at FROM articles WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get article by ID")?;

    Ok(row.as_ref().map(row_to_article_mysql))
}

async fn list_articles_mysql(
    pool: &MySqlPool,
    offset: i64,
    limit: i64,
) -> Result<Vec<ArticleSummary>> {
    let rows = sqlx::query(LIST_SQL)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list articles")?;

    Ok(rows
        .iter()
        .map(|row| ArticleSummary {
            article: row_to_article_mysql(row),
            comment_count: row.get("comment_count"),
        })
        .collect())
}

async fn count_articles_mysql(pool: &MySqlPool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM articles")
        .fetch_one(pool)
        .await
        .context("Failed to count articles")?;

    Ok(row.get("count"))
}

async fn update_article_mysql(
    pool: &MySqlPool,
    id: i64,
    input: &ArticleInput,
) -> Result<Option<Article>> {
    // MySQL reports zero affected rows when nothing changed, so check
    // existence first.
    if get_article_by_id_mysql(pool, id).await?.is_none() {
        return Ok(None);
    }

    sqlx::query("UPDATE articles SET title = ?, content = ?, author = ? WHERE id = ?")
        .bind(&input.title)
        .bind(&input.content)
        .bind(&input.author)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update article")?;

    get_article_by_id_mysql(pool, id).await
}

async fn delete_article_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    sqlx::query("DELETE FROM comments WHERE article_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete article comments")?;

    let result = sqlx::query("DELETE FROM articles WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete article")?;

    tx.commit().await.context("Failed to commit article delete")?;

    Ok(result.rows_affected() > 0)
}

fn row_to_article_mysql(row: &sqlx::mysql::MySqlRow) -> Article {
    Article {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        author: row.get("author"),
        created_at: row.get("created_at"),
    }
}
