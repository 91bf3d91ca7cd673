//! User repository
//!
//! Database operations for users. Username uniqueness is enforced by the
//! schema; callers can recognize the violation with [`is_unique_violation`].

use crate::db::{Backend, DynDatabasePool};
use crate::models::{CreateUserInput, User};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, input: &CreateUserInput) -> Result<User>;

    /// Get user by username
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;
}

/// SQLx-based user repository implementation
pub struct SqlxUserRepository {
    pool: DynDatabasePool,
}

impl SqlxUserRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, input: &CreateUserInput) -> Result<User> {
        let now = Utc::now();
        let id = match self.pool.backend() {
            Backend::Sqlite(p) => create_user_sqlite(p, input, now).await?,
            Backend::Mysql(p) => create_user_mysql(p, input, now).await?,
        };

        Ok(User {
            id,
            username: input.username.clone(),
            password_hash: input.password_hash.clone(),
            created_at: now,
        })
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        match self.pool.backend() {
            Backend::Sqlite(p) => get_user_by_username_sqlite(p, username).await,
            Backend::Mysql(p) => get_user_by_username_mysql(p, username).await,
        }
    }
}

/// Whether `err` was caused by a UNIQUE constraint violation
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

const INSERT_SQL: &str =
    "INSERT INTO users (username, password_hash, created_at) VALUES (?, ?, ?)";

const SELECT_BY_USERNAME_SQL: &str =
    "SELECT id, username, password_hash, created_at FROM users WHERE username = ?";

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_user_sqlite(
    pool: &SqlitePool,
    input: &CreateUserInput,
    now: chrono::DateTime<Utc>,
) -> Result<i64> {
    let result = sqlx::query(INSERT_SQL)
        .bind(&input.username)
        .bind(&input.password_hash)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to create user")?;

    Ok(result.last_insert_rowid())
}

async fn get_user_by_username_sqlite(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    let row = sqlx::query(SELECT_BY_USERNAME_SQL)
        .bind(username)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by username")?;

    Ok(row.map(|row| User {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
    }))
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_user_mysql(
    pool: &MySqlPool,
    input: &CreateUserInput,
    now: chrono::DateTime<Utc>,
) -> Result<i64> {
    let result = sqlx::query(INSERT_SQL)
        .bind(&input.username)
        .bind(&input.password_hash)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to create user")?;

    Ok(result.last_insert_id() as i64)
}

async fn get_user_by_username_mysql(pool: &MySqlPool, username: &str) -> Result<Option<User>> {
    let row = sqlx::query(SELECT_BY_USERNAME_SQL)
        .bind(username)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by username")?;

    Ok(row.map(|row| User {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
    }))
}
