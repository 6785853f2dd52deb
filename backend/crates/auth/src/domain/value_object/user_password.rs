//! User Password Value Objects
//!
//! Domain wrappers over `platform::password` that turn policy and hashing
//! failures into user-facing `AppError`s.

use kernel::error::app_error::{AppError, AppResult, ResultExt};
use kernel::error::kind::ErrorKind;
use platform::password::{ClearTextPassword, HashedPassword, PasswordPolicyError};
use std::fmt;
use std::sync::LazyLock;

/// Password a user is choosing, already checked against the policy
pub struct NewPassword(ClearTextPassword);

impl NewPassword {
    pub fn new(raw: String) -> AppResult<Self> {
        let clear_text = ClearTextPassword::new(raw).map_err(|e| match e {
            PasswordPolicyError::TooShort { min, actual } => AppError::bad_request(format!(
                "Password must be at least {min} characters (got {actual})"
            ))
            .with_action("Please choose a longer password"),

            PasswordPolicyError::TooLong { max, actual } => AppError::bad_request(format!(
                "Password must be at most {max} characters (got {actual})"
            ))
            .with_action("Please choose a shorter password"),

            PasswordPolicyError::EmptyOrWhitespace => {
                AppError::bad_request("Password cannot be empty")
                    .with_action("Please enter a password")
            }

            PasswordPolicyError::InvalidCharacter => {
                AppError::bad_request("Password contains invalid characters")
                    .with_action("Please remove any special control characters")
            }

            PasswordPolicyError::CommonPattern => {
                AppError::bad_request("Password is too common or follows a predictable pattern")
                    .with_action("Please choose a more unique password")
            }
        })?;

        Ok(Self(clear_text))
    }
}

impl fmt::Debug for NewPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NewPassword").field(&"[REDACTED]").finish()
    }
}

/// Password supplied at sign-in. No policy, only normalization.
pub struct PasswordAttempt(ClearTextPassword);

impl PasswordAttempt {
    pub fn new(raw: String) -> Self {
        Self(ClearTextPassword::for_comparison(raw))
    }
}

impl fmt::Debug for PasswordAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PasswordAttempt").field(&"[REDACTED]").finish()
    }
}

/// Stored Argon2id hash (PHC string)
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

/// Hash of a random password nobody knows, built once with the same
/// parameters as real account hashes
static UNKNOWN_ACCOUNT: LazyLock<Option<UserPassword>> = LazyLock::new(|| {
    ClearTextPassword::for_comparison(uuid::Uuid::new_v4().to_string())
        .hash()
        .map(UserPassword)
        .inspect_err(|e| tracing::error!(error = %e, "Failed to build unknown-account hash"))
        .ok()
});

impl UserPassword {
    pub fn from_new(password: &NewPassword) -> AppResult<Self> {
        let hashed = password
            .0
            .hash()
            .map_app_err(ErrorKind::InternalServerError, "Password hashing failed")?;
        Ok(Self(hashed))
    }

    pub fn from_phc_string(phc_string: impl Into<String>) -> AppResult<Self> {
        let hashed = HashedPassword::from_phc_string(phc_string).map_app_err(
            ErrorKind::InternalServerError,
            "Invalid password hash in database",
        )?;
        Ok(Self(hashed))
    }

    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    pub fn verify(&self, attempt: &PasswordAttempt) -> bool {
        self.0.verify(&attempt.0)
    }

    /// Stand-in hash for sign-ins that match no account.
    ///
    /// Comparing against it costs the same Argon2 work as a wrong password
    /// and never succeeds.
    pub fn unknown_account() -> Option<&'static UserPassword> {
        UNKNOWN_ACCOUNT.as_ref()
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}
