//! User service
//!
//! Registration and credential checks. Session state lives in
//! [`SessionStore`](super::SessionStore); this service only answers whether a
//! username/password pair is valid.

use crate::db::repositories::{is_unique_violation, UserRepository};
use crate::models::{CreateUserInput, User};
use crate::services::password::{hash_password, verify_password};
use anyhow::Context;
use serde::Deserialize;
use std::sync::Arc;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Authentication failed (invalid credentials)
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Username already taken
    #[error("Username '{0}' is already taken")]
    UserExists(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Registration form
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Login form
#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// User service for registration and authentication
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Register a new user with a hashed password.
    ///
    /// # Errors
    ///
    /// - `ValidationError` if username or password is empty
    /// - `UserExists` if the username is taken
    /// - `InternalError` if hashing or storage fails
    pub async fn register(&self, input: RegisterInput) -> Result<User, UserServiceError> {
        let username = input.username.trim();
        if username.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Username is required".to_string(),
            ));
        }
        if input.password.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Password is required".to_string(),
            ));
        }

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;

        let created = self
            .users
            .create(&CreateUserInput {
                username: username.to_string(),
                password_hash,
            })
            .await;

        match created {
            Ok(user) => {
                tracing::info!("Registered user '{}'", user.username);
                Ok(user)
            }
            Err(e) if is_unique_violation(&e) => {
                Err(UserServiceError::UserExists(username.to_string()))
            }
            Err(e) => Err(UserServiceError::InternalError(
                e.context("Failed to create user"),
            )),
        }
    }

    /// Check credentials and return the matching user.
    ///
    /// Unknown usernames and wrong passwords produce the same error.
    pub async fn authenticate(&self, input: &LoginInput) -> Result<User, UserServiceError> {
        let user = self
            .users
            .get_by_username(input.username.trim())
            .await
            .context("Failed to look up user")?
            .ok_or_else(|| {
                tracing::debug!("Login rejected: unknown user '{}'", input.username);
                UserServiceError::InvalidCredentials
            })?;

        let valid = verify_password(&input.password, &user.password_hash)
            .context("Failed to verify password")?;

        if !valid {
            tracing::debug!("Login rejected: wrong password for '{}'", user.username);
            return Err(UserServiceError::InvalidCredentials);
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxUserRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_service() -> (UserService, Arc<dyn UserRepository>) {
        let pool = create_test_pool()
            .await
            .expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let repo = SqlxUserRepository::boxed(pool);
        (UserService::new(repo.clone()), repo)
    }

    fn register_input(username: &str, password: &str) -> RegisterInput {
        RegisterInput {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    fn login_input(username: &str, password: &str) -> LoginInput {
        LoginInput {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_plaintext() {
        let (service, repo) = setup_test_service().await;

        service
            .register(register_input("alice", "s3cret"))
            .await
            .expect("Registration should succeed");

        let stored = repo.get_by_username("alice").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "s3cret");
        assert!(verify_password("s3cret", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let (service, _repo) = setup_test_service().await;

        service.register(register_input("alice", "one")).await.unwrap();
        let err = service
            .register(register_input("alice", "two"))
            .await
            .unwrap_err();

        assert!(matches!(err, UserServiceError::UserExists(name) if name == "alice"));
    }

    #[tokio::test]
    async fn test_register_requires_fields() {
        let (service, _repo) = setup_test_service().await;

        let err = service.register(register_input("", "pw")).await.unwrap_err();
        assert!(matches!(err, UserServiceError::ValidationError(_)));

        let err = service.register(register_input("bob", "")).await.unwrap_err();
        assert!(matches!(err, UserServiceError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_authenticate() {
        let (service, _repo) = setup_test_service().await;
        service.register(register_input("alice", "pw")).await.unwrap();

        let user = service.authenticate(&login_input("alice", "pw")).await.unwrap();
        assert_eq!(user.username, "alice");

        let err = service
            .authenticate(&login_input("alice", "wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserServiceError::InvalidCredentials));

        let err = service
            .authenticate(&login_input("nobody", "pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserServiceError::InvalidCredentials));
    }
}
