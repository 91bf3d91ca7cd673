//! Session store
//!
//! Resolves the session cookie value to a persisted [`Session`]. Unknown
//! and expired sessions resolve to `None`; a login always starts a new
//! session.

use crate::db::repositories::SessionRepository;
use crate::models::Session;
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use std::sync::Arc;

pub struct SessionStore {
    repo: Arc<dyn SessionRepository>,
    max_age: Duration,
}

impl SessionStore {
    pub fn new(repo: Arc<dyn SessionRepository>, max_age_days: i64) -> Self {
        Self {
            repo,
            max_age: Duration::days(max_age_days),
        }
    }

    /// Lifetime given to new and refreshed sessions
    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Look up a live session by id. Expired sessions resolve to `None`.
    pub async fn find(&self, id: &str) -> Result<Option<Session>> {
        let session = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to load session")?;

        Ok(session.filter(|s| !s.is_expired()))
    }

    /// Start a new session for a fresh login.
    ///
    /// The caller's previous session, if the cookie named one, is removed so
    /// an id issued before authentication never becomes authenticated.
    pub async fn start(&self, previous: Option<&str>) -> Result<Session> {
        if let Some(id) = previous {
            self.repo
                .delete(id)
                .await
                .context("Failed to drop previous session")?;
        }
        Ok(Session::new(self.max_age))
    }

    /// Persist the session and push its expiry forward
    pub async fn save(&self, session: &mut Session) -> Result<()> {
        let now = Utc::now();
        session.expires_at = now + self.max_age;
        session.updated_at = now;
        self.repo.save(session).await
    }

    /// Remove every expired session
    pub async fn purge_expired(&self) -> Result<u64> {
        let removed = self
            .repo
            .delete_expired()
            .await
            .context("Failed to purge expired sessions")?;

        if removed > 0 {
            tracing::info!("Purged {} expired session(s)", removed);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxSessionRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup_store() -> (SessionStore, Arc<dyn SessionRepository>) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxSessionRepository::boxed(pool);
        (SessionStore::new(repo.clone(), 7), repo)
    }

    #[tokio::test]
    async fn test_start_without_cookie() {
        let (store, _repo) = setup_store().await;

        let session = store.start(None).await.unwrap();
        assert!(!session.is_authenticated());
        assert!(store.find(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_round_trip() {
        let (store, _repo) = setup_store().await;

        let mut session = store.start(None).await.unwrap();
        session.log_in("alice");
        store.save(&mut session).await.unwrap();

        let loaded = store.find(&session.id).await.unwrap().expect("session");
        assert_eq!(loaded.id, session.id);
        assert_eq!(loaded.username(), Some("alice"));
    }

    #[tokio::test]
    async fn test_start_replaces_previous_session() {
        let (store, repo) = setup_store().await;

        let planted = Session::new(Duration::days(1));
        repo.save(&planted).await.unwrap();

        let mut fresh = store.start(Some(&planted.id)).await.unwrap();
        assert_ne!(fresh.id, planted.id);
        fresh.log_in("alice");
        store.save(&mut fresh).await.unwrap();

        assert!(repo.get_by_id(&planted.id).await.unwrap().is_none());
        assert!(store.find(&fresh.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_expired_session_is_ignored_and_purged() {
        let (store, repo) = setup_store().await;

        let mut stale = Session::new(Duration::days(1));
        stale.log_in("alice");
        stale.expires_at = Utc::now() - Duration::minutes(5);
        repo.save(&stale).await.unwrap();

        assert!(store.find(&stale.id).await.unwrap().is_none());

        assert_eq!(store.purge_expired().await.unwrap(), 1);
        assert!(repo.get_by_id(&stale.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let (store, _repo) = setup_store().await;

        assert!(store.find("forged-id").await.unwrap().is_none());
        let session = store.start(Some("forged-id")).await.unwrap();
        assert_ne!(session.id, "forged-id");
    }
}
