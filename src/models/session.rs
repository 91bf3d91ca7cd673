//! Session model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const AUTHENTICATED_KEY: &str = "authenticated";
const USERNAME_KEY: &str = "username";

/// Server-side session addressed by the cookie value.
///
/// `values` is an open key/value map; the blog itself only uses
/// `authenticated` and `username`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Session ID (token carried in the cookie)
    pub id: String,
    pub values: Map<String, Value>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Start a fresh, empty session living for `max_age`
    pub fn new(max_age: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            values: Map::new(),
            expires_at: now + max_age,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }

    /// True only when `authenticated` holds the JSON boolean `true`
    pub fn is_authenticated(&self) -> bool {
        matches!(self.values.get(AUTHENTICATED_KEY), Some(Value::Bool(true)))
    }

    /// Logged-in username, if any
    pub fn username(&self) -> Option<&str> {
        if !self.is_authenticated() {
            return None;
        }
        self.values
            .get(USERNAME_KEY)
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn log_in(&mut self, username: &str) {
        self.set(AUTHENTICATED_KEY, true);
        self.set(USERNAME_KEY, username);
    }

    pub fn log_out(&mut self) {
        self.set(AUTHENTICATED_KEY, false);
        self.set(USERNAME_KEY, "");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_session_is_anonymous() {
        let session = Session::new(Duration::days(7));
        assert!(!session.is_authenticated());
        assert!(session.username().is_none());
        assert!(!session.is_expired());
        assert!(uuid::Uuid::parse_str(&session.id).is_ok());
    }

    #[test]
    fn test_log_in_and_out() {
        let mut session = Session::new(Duration::days(7));

        session.log_in("alice");
        assert!(session.is_authenticated());
        assert_eq!(session.username(), Some("alice"));

        session.log_out();
        assert!(!session.is_authenticated());
        assert_eq!(session.values["authenticated"], json!(false));
        assert_eq!(session.values["username"], json!(""));
    }

    #[test]
    fn test_only_boolean_true_authenticates() {
        let mut session = Session::new(Duration::days(7));

        for value in [json!("true"), json!(1), json!(null), json!(false)] {
            session.set("authenticated", value);
            assert!(!session.is_authenticated());
        }

        session.set("authenticated", json!(true));
        assert!(session.is_authenticated());
    }

    #[test]
    fn test_is_expired() {
        let session = Session::new(Duration::seconds(-1));
        assert!(session.is_expired());
    }
}
