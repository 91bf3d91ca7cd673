//! Session repository
//!
//! Sessions are stored with their values serialized as a JSON object in the
//! `data` column. Saving is an upsert keyed by the session id.

use crate::db::{Backend, DynDatabasePool};
use crate::models::Session;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Session repository trait
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Get session by ID (token)
    async fn get_by_id(&self, id: &str) -> Result<Option<Session>>;

    /// Insert the session or overwrite the stored one
    async fn save(&self, session: &Session) -> Result<()>;

    /// Delete a session
    async fn delete(&self, id: &str) -> Result<()>;

    /// Delete expired sessions, returning how many were removed
    async fn delete_expired(&self) -> Result<u64>;
}

/// SQLx-based session repository implementation
pub struct SqlxSessionRepository {
    pool: DynDatabasePool,
}

impl SqlxSessionRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn SessionRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl SessionRepository for SqlxSessionRepository {
    async fn get_by_id(&self, id: &str) -> Result<Option<Session>> {
        match self.pool.backend() {
            Backend::Sqlite(p) => get_session_by_id_sqlite(p, id).await,
            Backend::Mysql(p) => get_session_by_id_mysql(p, id).await,
        }
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let data = serde_json::to_string(&session.values)
            .context("Failed to serialize session values")?;
        match self.pool.backend() {
            Backend::Sqlite(p) => save_session_sqlite(p, session, &data).await,
            Backend::Mysql(p) => save_session_mysql(p, session, &data).await,
        }
    }

    async fn delete(&self, id: &str) -> Result<()> {
        match self.pool.backend() {
            Backend::Sqlite(p) => {
                sqlx::query("DELETE FROM sessions WHERE id = ?")
                    .bind(id)
                    .execute(p)
                    .await
                    .context("Failed to delete session")?;
            }
            Backend::Mysql(p) => {
                sqlx::query("DELETE FROM sessions WHERE id = ?")
                    .bind(id)
                    .execute(p)
                    .await
                    .context("Failed to delete session")?;
            }
        }
        Ok(())
    }

    async fn delete_expired(&self) -> Result<u64> {
        let now = Utc::now();
        let affected = match self.pool.backend() {
            Backend::Sqlite(p) => sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
                .bind(now)
                .execute(p)
                .await
                .context("Failed to delete expired sessions")?
                .rows_affected(),
            Backend::Mysql(p) => sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
                .bind(now)
                .execute(p)
                .await
                .context("Failed to delete expired sessions")?
                .rows_affected(),
        };
        Ok(affected)
    }
}

/// Decode the `data` column. Anything that is not a JSON object is treated
/// as an empty session.
fn parse_values(id: &str, data: &str) -> Map<String, Value> {
    match serde_json::from_str::<Value>(data) {
        Ok(Value::Object(map)) => map,
        Ok(_) | Err(_) => {
            tracing::warn!("Ignoring malformed data for session {}", id);
            Map::new()
        }
    }
}

const SELECT_SQL: &str = r#"
    SELECT id, data, expires_at, created_at, updated_at
    FROM sessions
    WHERE id = ?
"#;

// ============================================================================
// SQLite implementations
// ============================================================================

async fn get_session_by_id_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<Session>> {
    let row = sqlx::query(SELECT_SQL)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get session by ID")?;

    Ok(row.map(|row| {
        let id: String = row.get("id");
        let data: String = row.get("data");
        Session {
            values: parse_values(&id, &data),
            id,
            expires_at: row.get("expires_at"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }))
}

async fn save_session_sqlite(pool: &SqlitePool, session: &Session, data: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO sessions (id, data, expires_at, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            data = excluded.data,
            expires_at = excluded.expires_at,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&session.id)
    .bind(data)
    .bind(session.expires_at)
    .bind(session.created_at)
    .bind(Utc::now())
    .execute(pool)
    .await
    .context("Failed to save session")?;

    Ok(())
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn get_session_by_id_mysql(pool: &MySqlPool, id: &str) -> Result<Option<Session>> {
    let row = sqlx::query(SELECT_SQL)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get session by ID")?;

    Ok(row.map(|row| {
        let id: String = row.get("id");
        let data: String = row.get("data");
        Session {
            values: parse_values(&id, &data),
            id,
            expires_at: row.get("expires_at"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }))
}

async fn save_session_mysql(pool: &MySqlPool, session: &Session, data: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO sessions (id, data, expires_at, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        ON DUPLICATE KEY UPDATE
            data = VALUES(data),
            expires_at = VALUES(expires_at),
            updated_at = VALUES(updated_at)
        "#,
    )
    .bind(&session.id)
    .bind(data)
    .bind(session.expires_at)
    .bind(session.created_at)
    .bind(Utc::now())
    .execute(pool)
    .await
    .context("Failed to save session")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use chrono::Duration;
    use serde_json::json;

    async fn setup_test_repo() -> (DynDatabasePool, SqlxSessionRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxSessionRepository::new(pool.clone());
        (pool, repo)
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let (_pool, repo) = setup_test_repo().await;

        let mut session = Session::new(Duration::days(7));
        session.log_in("alice");
        repo.save(&session).await.expect("Failed to save session");

        let loaded = repo
            .get_by_id(&session.id)
            .await
            .unwrap()
            .expect("Session should exist");
        assert!(loaded.is_authenticated());
        assert_eq!(loaded.username(), Some("alice"));
    }

    #[tokio::test]
    async fn test_save_overwrites_existing() {
        let (_pool, repo) = setup_test_repo().await;

        let mut session = Session::new(Duration::days(7));
        session.log_in("alice");
        repo.save(&session).await.unwrap();

        session.log_out();
        repo.save(&session).await.unwrap();

        let loaded = repo.get_by_id(&session.id).await.unwrap().unwrap();
        assert!(!loaded.is_authenticated());
        assert_eq!(loaded.values["username"], json!(""));
    }

    #[tokio::test]
    async fn test_unknown_id_is_none() {
        let (_pool, repo) = setup_test_repo().await;
        assert!(repo.get_by_id("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_data_loads_as_empty() {
        let (pool, repo) = setup_test_repo().await;

        let session = Session::new(Duration::days(1));
        repo.save(&session).await.unwrap();
        pool.execute(&format!(
            "UPDATE sessions SET data = 'not json' WHERE id = '{}'",
            session.id
        ))
        .await
        .unwrap();

        let loaded = repo.get_by_id(&session.id).await.unwrap().unwrap();
        assert!(loaded.values.is_empty());
        assert!(!loaded.is_authenticated());
    }

    #[tokio::test]
    async fn test_delete_expired() {
        let (_pool, repo) = setup_test_repo().await;

        let live = Session::new(Duration::days(1));
        let stale = Session::new(Duration::seconds(-60));
        repo.save(&live).await.unwrap();
        repo.save(&stale).await.unwrap();

        let removed = repo.delete_expired().await.unwrap();
        assert_eq!(removed, 1);
        assert!(repo.get_by_id(&live.id).await.unwrap().is_some());
        assert!(repo.get_by_id(&stale.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let (_pool, repo) = setup_test_repo().await;

        let session = Session::new(Duration::days(1));
        repo.save(&session).await.unwrap();
        repo.delete(&session.id).await.unwrap();

        assert!(repo.get_by_id(&session.id).await.unwrap().is_none());
    }
}
