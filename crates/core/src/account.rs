//! Login decision sequence and rate-limiting policy.
//!
//! Failed attempts are counted on the user row; crossing the threshold
//! locks the account for a fixed window during which every login attempt
//! is rejected regardless of credentials. The lock window is checked
//! before the password so a locked account leaks nothing about credential
//! correctness.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Maximum consecutive failed login attempts before locking the account.
pub const MAX_FAILED_LOGIN_ATTEMPTS: i32 = 5;

/// Duration in minutes to lock an account after exceeding failed attempts.
pub const LOCK_DURATION_MINS: i64 = 15;

/// Whether the account is locked at `now`.
pub fn is_locked(locked_until: Option<Timestamp>, now: Timestamp) -> bool {
    matches!(locked_until, Some(until) if until > now)
}

/// Whether this failure count triggers a lock.
pub fn should_lock(failed_count: i32) -> bool {
    failed_count >= MAX_FAILED_LOGIN_ATTEMPTS
}

/// Credential state needed for one login decision.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user_id: DbId,
    pub password_hash: String,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
}

/// Storage collaborator for [`authenticate`].
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Credentials>, CoreError>;
    async fn record_failure(&self, user_id: DbId) -> Result<(), CoreError>;
    async fn lock_until(&self, user_id: DbId, until: Timestamp) -> Result<(), CoreError>;
    async fn record_success(&self, user_id: DbId) -> Result<(), CoreError>;
}

/// Login failure taxonomy. `Display` texts are user-facing; an unknown
/// email and a wrong password share one message.
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Too many login attempts. Please try again in 15 minutes.")]
    Locked,

    #[error(transparent)]
    Store(#[from] CoreError),
}

/// Run the login decision sequence for one attempt.
///
/// Order is load-bearing:
///
/// 1. unknown email → `InvalidCredentials`;
/// 2. active lock window → `Locked`, the password is never inspected;
/// 3. wrong password → failure recorded, lock set when the threshold is
///    hit, `InvalidCredentials`;
/// 4. correct password → counters reset, the user's id is returned.
///
/// `verify` receives the stored hash so the hashing scheme stays with the
/// caller.
pub async fn authenticate<F>(
    store: &dyn CredentialStore,
    email: &str,
    now: Timestamp,
    verify: F,
) -> Result<DbId, LoginError>
where
    F: FnOnce(&str) -> Result<bool, CoreError>,
{
    let Some(creds) = store.find_by_email(email).await? else {
        return Err(LoginError::InvalidCredentials);
    };

    if is_locked(creds.locked_until, now) {
        return Err(LoginError::Locked);
    }

    if !verify(&creds.password_hash)? {
        store.record_failure(creds.user_id).await?;

        if should_lock(creds.failed_login_count + 1) {
            let until = now + chrono::Duration::minutes(LOCK_DURATION_MINS);
            store.lock_until(creds.user_id, until).await?;
            tracing::warn!(
                user_id = creds.user_id,
                "Account locked after repeated failures"
            );
        }

        return Err(LoginError::InvalidCredentials);
    }

    store.record_success(creds.user_id).await?;
    Ok(creds.user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};
    use std::cell::Cell;
    use std::sync::Mutex;

    #[test]
    fn locks_on_fifth_failure_not_before() {
        assert!(!should_lock(4));
        assert!(should_lock(5));
        assert!(should_lock(6));
    }

    #[test]
    fn lock_expires_after_window() {
        let now = Utc::now();
        assert!(is_locked(Some(now + Duration::minutes(1)), now));
        assert!(!is_locked(Some(now - Duration::seconds(1)), now));
        assert!(!is_locked(None, now));
    }

    /// One user keyed by email, recording every mutation.
    struct FakeCredentials {
        email: String,
        creds: Credentials,
        failures: Mutex<Vec<DbId>>,
        locks: Mutex<Vec<Timestamp>>,
        successes: Mutex<Vec<DbId>>,
    }

    impl FakeCredentials {
        fn new(email: &str, creds: Credentials) -> Self {
            Self {
                email: email.to_string(),
                creds,
                failures: Mutex::new(Vec::new()),
                locks: Mutex::new(Vec::new()),
                successes: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CredentialStore for FakeCredentials {
        async fn find_by_email(&self, email: &str) -> Result<Option<Credentials>, CoreError> {
            Ok((email == self.email).then(|| self.creds.clone()))
        }

        async fn record_failure(&self, user_id: DbId) -> Result<(), CoreError> {
            self.failures.lock().unwrap().push(user_id);
            Ok(())
        }

        async fn lock_until(&self, user_id: DbId, until: Timestamp) -> Result<(), CoreError> {
            assert_eq!(user_id, self.creds.user_id);
            self.locks.lock().unwrap().push(until);
            Ok(())
        }

        async fn record_success(&self, user_id: DbId) -> Result<(), CoreError> {
            self.successes.lock().unwrap().push(user_id);
            Ok(())
        }
    }

    fn creds(failed_count: i32, locked_until: Option<Timestamp>) -> Credentials {
        Credentials {
            user_id: 7,
            password_hash: "$argon2id$stored-hash".to_string(),
            failed_login_count: failed_count,
            locked_until,
        }
    }

    #[tokio::test]
    async fn locked_account_rejects_without_inspecting_the_password() {
        let now = Utc::now();
        let store = FakeCredentials::new("ada@example.com", creds(5, Some(now + Duration::minutes(10))));

        let verify_ran = Cell::new(false);
        let result = authenticate(&store, "ada@example.com", now, |_hash| {
            verify_ran.set(true);
            // Even a correct password must not matter while locked.
            Ok(true)
        })
        .await;

        assert_matches!(result, Err(LoginError::Locked));
        assert!(!verify_ran.get(), "password must not be checked while locked");
        assert!(store.failures.lock().unwrap().is_empty());
        assert!(store.successes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_email_gets_the_generic_message() {
        let now = Utc::now();
        let store = FakeCredentials::new("ada@example.com", creds(0, None));

        let result = authenticate(&store, "nobody@example.com", now, |_| Ok(true)).await;

        assert_matches!(result, Err(LoginError::InvalidCredentials));
        assert_eq!(
            result.unwrap_err().to_string(),
            "Invalid email or password"
        );
    }

    #[tokio::test]
    async fn wrong_password_records_a_failure_without_locking_below_threshold() {
        let now = Utc::now();
        let store = FakeCredentials::new("ada@example.com", creds(2, None));

        let result = authenticate(&store, "ada@example.com", now, |_| Ok(false)).await;

        assert_matches!(result, Err(LoginError::InvalidCredentials));
        assert_eq!(store.failures.lock().unwrap().as_slice(), &[7]);
        assert!(store.locks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn fifth_failure_locks_for_the_full_window() {
        let now = Utc::now();
        let store = FakeCredentials::new("ada@example.com", creds(4, None));

        let result = authenticate(&store, "ada@example.com", now, |_| Ok(false)).await;

        assert_matches!(result, Err(LoginError::InvalidCredentials));
        let locks = store.locks.lock().unwrap();
        assert_eq!(locks.len(), 1);
        assert_eq!(locks[0], now + Duration::minutes(LOCK_DURATION_MINS));
    }

    #[tokio::test]
    async fn expired_lock_allows_a_correct_password_again() {
        let now = Utc::now();
        let store = FakeCredentials::new(
            "ada@example.com",
            creds(5, Some(now - Duration::seconds(1))),
        );

        let result = authenticate(&store, "ada@example.com", now, |_| Ok(true)).await;

        assert_matches!(result, Ok(7));
        assert_eq!(store.successes.lock().unwrap().as_slice(), &[7]);
    }

    #[tokio::test]
    async fn verify_receives_the_stored_hash() {
        let now = Utc::now();
        let store = FakeCredentials::new("ada@example.com", creds(0, None));

        let result = authenticate(&store, "ada@example.com", now, |hash| {
            assert_eq!(hash, "$argon2id$stored-hash");
            Ok(true)
        })
        .await;

        assert_matches!(result, Ok(7));
    }
}
