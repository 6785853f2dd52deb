//! Environment Configuration Helpers
//!
//! Every reader takes a lookup function instead of calling `std::env`
//! directly, so configuration can be built from a map in tests and from the
//! process environment in the binary.

use std::str::FromStr;

use thiserror::Error;

/// Variable selecting production or development defaults
pub const APP_ENV_VAR: &str = "APP_ENV";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    #[error("Missing required env var: {0}")]
    Missing(String),

    #[error("Invalid value for env var {name}: {reason}")]
    Invalid { name: String, reason: String },
}

/// Deployment mode, which decides permissive or strict defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppMode {
    #[default]
    Development,
    Production,
}

impl AppMode {
    /// `APP_ENV=production` (case-insensitive) selects production,
    /// anything else is development.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup(APP_ENV_VAR) {
            Some(value) if value.trim().eq_ignore_ascii_case("production") => AppMode::Production,
            _ => AppMode::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, AppMode::Production)
    }
}

/// Reads the process environment
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// A variable that must be present and not blank
///
/// The value is returned untrimmed; only the emptiness check ignores
/// surrounding whitespace.
pub fn required(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Result<String, EnvError> {
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(EnvError::Missing(name.to_string())),
    }
}

/// A variable that may be absent; blank counts as absent
pub fn optional(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parse an optional variable, falling back to `default` when absent
pub fn parse_or<T>(
    lookup: impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, EnvError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional(lookup, name) {
        None => Ok(default),
        Some(raw) => raw.parse::<T>().map_err(|e| EnvError::Invalid {
            name: name.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}
