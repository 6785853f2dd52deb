//! User Name Value Object
//!
//! Login handle chosen at registration. Uniqueness is case-insensitive and
//! enforced by the credential store.

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const USER_NAME_MIN_LENGTH: usize = 3;
pub const USER_NAME_MAX_LENGTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserName(String);

impl UserName {
    /// Validate a new user name.
    ///
    /// ASCII letters, digits, `_`, `.` and `-`; it must start with a letter
    /// or digit.
    pub fn new(raw: impl Into<String>) -> AppResult<Self> {
        let name = raw.into().trim().to_string();
        let len = name.chars().count();

        if len < USER_NAME_MIN_LENGTH || len > USER_NAME_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "User name must be {USER_NAME_MIN_LENGTH}-{USER_NAME_MAX_LENGTH} characters"
            )));
        }

        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        {
            return Err(AppError::bad_request(
                "User name may only contain letters, digits, '_', '.' and '-'",
            )
            .with_action("Remove spaces and special characters"));
        }

        if !name.starts_with(|c: char| c.is_ascii_alphanumeric()) {
            return Err(AppError::bad_request(
                "User name must start with a letter or digit",
            ));
        }

        Ok(Self(name))
    }

    /// Value read back from storage, already validated on the way in
    pub fn from_db(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
