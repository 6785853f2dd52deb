//! Blocking Work
//!
//! Argon2 hashing and verification take tens of milliseconds of CPU; they
//! run on tokio's blocking pool instead of an async worker.

use crate::domain::value_object::user_password::{NewPassword, UserPassword};
use crate::error::{AuthError, AuthResult};

/// Run `work` on the blocking pool
pub(crate) async fn run_blocking<T, F>(work: F) -> AuthResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AuthError::Internal(format!("blocking task failed: {e}")))
}

/// Hash a policy-checked password off the async workers
pub(crate) async fn hash_password(password: NewPassword) -> AuthResult<UserPassword> {
    Ok(run_blocking(move || UserPassword::from_new(&password)).await??)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::user_password::PasswordAttempt;

    #[tokio::test]
    async fn test_hash_password_off_thread() {
        let chosen = NewPassword::new("Touchline-Tactics-42".to_string()).unwrap();
        let hashed = hash_password(chosen).await.unwrap();
        assert!(hashed.verify(&PasswordAttempt::new("Touchline-Tactics-42".to_string())));
    }

    #[tokio::test]
    async fn test_panicking_task_is_internal_error() {
        let err = run_blocking(|| -> u8 { panic!("boom") }).await.unwrap_err();
        assert!(matches!(err, AuthError::Internal(_)));
    }
}
