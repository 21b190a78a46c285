//! Opaque bearer-token session store.
//!
//! Sessions are held in memory behind a [`tokio::sync::RwLock`]. A session is
//! created on login, looked up on every authenticated request, and removed on
//! logout. Tokens are 48-character random alphanumeric strings; they carry no
//! embedded claims, so revocation is immediate.
//!
//! Sessions have no TTL: a token stays valid until it is revoked or the
//! process exits, and the map grows with logins that never log out. A
//! deployment that needs bounded memory should add an expiry sweep here
//! before exposing the server to untrusted traffic.

use std::collections::HashMap;

use atelier_core::types::DbId;
use rand::distributions::Alphanumeric;
use rand::Rng;
use tokio::sync::RwLock;

/// Length of generated session tokens.
const TOKEN_LENGTH: usize = 48;

/// A logged-in user's session data.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: DbId,
    pub username: String,
}

/// In-memory session manager keyed by bearer token.
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new session for the given user and return its bearer token.
    pub async fn issue(&self, user_id: DbId, username: &str) -> String {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LENGTH)
            .map(char::from)
            .collect();

        let session = Session {
            user_id,
            username: username.to_string(),
        };
        self.sessions.write().await.insert(token.clone(), session);
        token
    }

    /// Look up the session for a bearer token, if one exists.
    pub async fn get(&self, token: &str) -> Option<Session> {
        self.sessions.read().await.get(token).cloned()
    }

    /// Remove a session. Returns `true` if the token was active.
    pub async fn revoke(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_issue_and_get() {
        let manager = SessionManager::new();
        let token = manager.issue(7, "ada").await;
        assert_eq!(token.len(), TOKEN_LENGTH);

        let session = manager.get(&token).await.expect("session should exist");
        assert_eq!(session.user_id, 7);
        assert_eq!(session.username, "ada");
    }

    #[tokio::test]
    async fn test_tokens_are_unique() {
        let manager = SessionManager::new();
        let first = manager.issue(1, "a").await;
        let second = manager.issue(1, "a").await;
        assert_ne!(first, second, "each login should get a distinct token");
    }

    #[tokio::test]
    async fn test_revoke_removes_session() {
        let manager = SessionManager::new();
        let token = manager.issue(3, "bea").await;

        assert!(manager.revoke(&token).await);
        assert!(manager.get(&token).await.is_none());
        // Revoking again is a no-op.
        assert!(!manager.revoke(&token).await);
    }

    #[tokio::test]
    async fn test_unknown_token_is_none() {
        let manager = SessionManager::new();
        assert!(manager.get("no-such-token").await.is_none());
    }
}
