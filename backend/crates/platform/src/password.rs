//! Password Hashing and Verification
//!
//! - Argon2id hashing in PHC string format
//! - NIST SP 800-63B length rules on code points after NFKC normalization
//! - Clear text is zeroized on drop and redacted in `Debug`

use std::fmt;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Minimum password length (NIST: SHALL be at least 8)
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length (NIST: SHOULD permit at least 64)
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Rejections raised when a new password is chosen
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    #[error("Password contains invalid control characters")]
    InvalidCharacter,

    #[error("Password is too common or follows a predictable pattern")]
    CommonPattern,
}

#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

/// Clear text password, zeroized when dropped.
///
/// Not `Clone`, so the secret is never silently duplicated.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Validate a password a user is choosing (registration, admin-created accounts).
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let password = Self::for_comparison(raw);
        password.check_policy()?;
        Ok(password)
    }

    /// Normalize a password that is only going to be compared with a stored hash.
    ///
    /// The policy is not applied: a login attempt must fail on the hash
    /// comparison, not leak which rule the guess broke.
    pub fn for_comparison(raw: String) -> Self {
        let normalized: String = raw.nfkc().collect();
        let mut raw = raw;
        raw.zeroize();
        Self(normalized)
    }

    fn check_policy(&self) -> Result<(), PasswordPolicyError> {
        if self.0.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        // NIST counts code points, not bytes
        let char_count = self.0.chars().count();
        if char_count < MIN_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: char_count,
            });
        }
        if char_count > MAX_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if self
            .0
            .chars()
            .any(|ch| ch.is_control() && ch != '\t' && ch != '\n')
        {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        if is_common_pattern(&self.0) {
            return Err(PasswordPolicyError::CommonPattern);
        }

        Ok(())
    }

    /// Hash with Argon2id and a fresh 128-bit salt
    pub fn hash(&self) -> Result<HashedPassword, PasswordHashError> {
        let salt = SaltString::generate(OsRng);

        // Argon2::default() is Argon2id, m=19456 KiB, t=2, p=1 (OWASP baseline)
        let hash = Argon2::default()
            .hash_password(self.0.as_bytes(), &salt)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;

        Ok(HashedPassword {
            phc: hash.to_string(),
        })
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

/// Argon2 hash in PHC string format, safe to store.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    phc: String,
}

impl HashedPassword {
    /// Parse a stored PHC string
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let phc = s.into();
        PasswordHash::new(&phc).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        Ok(Self { phc })
    }

    pub fn as_phc_string(&self) -> &str {
        &self.phc
    }

    /// Compare a clear text password with this hash.
    ///
    /// argon2 compares the digests in constant time.
    pub fn verify(&self, password: &ClearTextPassword) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.phc) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.0.as_bytes(), &parsed)
            .is_ok()
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("phc", &"[HASH]")
            .finish()
    }
}

/// Repeated characters, digit runs, keyboard walks and a short deny list
fn is_common_pattern(password: &str) -> bool {
    let lower = password.to_lowercase();

    let mut chars = lower.chars();
    if let Some(first) = chars.next() {
        if chars.all(|c| c == first) {
            return true;
        }
    }

    if is_sequential_numbers(&lower) {
        return true;
    }

    const KEYBOARD_PATTERNS: &[&str] = &["qwerty", "asdfgh", "zxcvbn", "qazwsx", "1qaz2wsx"];
    if KEYBOARD_PATTERNS.iter().any(|p| lower.contains(p)) {
        return true;
    }

    const COMMON_PASSWORDS: &[&str] = &[
        "password",
        "password1",
        "password123",
        "abcdefgh",
        "letmein1",
        "welcome1",
        "admin123",
        "iloveyou",
        "football",
        "football1",
        "soccer123",
        "baseball",
        "trustno1",
    ];
    COMMON_PASSWORDS.contains(&lower.as_str())
}

/// Only digits, and every digit follows its predecessor (ascending or descending)
fn is_sequential_numbers(s: &str) -> bool {
    if !s.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let digits: Vec<u32> = s.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() < 4 {
        return false;
    }

    let ascending = digits.windows(2).all(|w| w[1] == (w[0] + 1) % 10);
    let descending = digits.windows(2).all(|w| w[0] == (w[1] + 1) % 10);
    ascending || descending
}
