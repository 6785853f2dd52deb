//! Security Configuration
//!
//! `SecretProvider` resolves the signing secret, the CORS allow-list and the
//! token/rate-limit settings once at startup. Everything it returns is
//! immutable and injected into the services that need it.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use platform::client::TrustedProxies;
use platform::config::{self as env, AppMode, EnvError};
use platform::rate_limit::RateLimitConfig;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const TOKEN_SECRET_VAR: &str = "AUTH_TOKEN_SECRET";
pub const CORS_ORIGINS_VAR: &str = "CORS_ORIGINS";
pub const TOKEN_TTL_VAR: &str = "AUTH_TOKEN_TTL_SECS";
pub const CLOCK_SKEW_VAR: &str = "AUTH_CLOCK_SKEW_SECS";
pub const RATE_LIMIT_MAX_VAR: &str = "RATE_LIMIT_MAX_REQUESTS";
pub const RATE_LIMIT_WINDOW_VAR: &str = "RATE_LIMIT_WINDOW_SECS";

/// Minimum signing secret length, in characters
pub const MIN_SECRET_LENGTH: usize = 32;

/// Upper bound on the accepted `iat` clock skew
pub const MAX_CLOCK_SKEW: Duration = Duration::from_secs(60);

/// Origins allowed outside production when `CORS_ORIGINS` is unset
pub const DEVELOPMENT_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:5173",
    "http://localhost:5000",
];

/// Startup configuration failure. Fatal: the process must not serve traffic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var} is not set")]
    MissingSecret { var: &'static str },

    #[error("{var} must be at least {min} characters (got {actual})")]
    SecretTooShort {
        var: &'static str,
        min: usize,
        actual: usize,
    },

    #[error("{name}: {reason}")]
    InvalidSetting { name: &'static str, reason: String },

    #[error(transparent)]
    Env(#[from] EnvError),
}

/// HMAC signing key. Zeroized on drop and never printed.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SigningSecret(String);

impl SigningSecret {
    pub fn new(raw: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ConfigError::MissingSecret {
                var: TOKEN_SECRET_VAR,
            });
        }
        let actual = raw.chars().count();
        if actual < MIN_SECRET_LENGTH {
            return Err(ConfigError::SecretTooShort {
                var: TOKEN_SECRET_VAR,
                min: MIN_SECRET_LENGTH,
                actual,
            });
        }
        Ok(Self(raw))
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SigningSecret").field(&"[REDACTED]").finish()
    }
}

/// Exact-match origin allow-list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedOrigins(BTreeSet<String>);

impl AllowedOrigins {
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(origins.into_iter().map(Into::into).collect())
    }

    /// Allow nothing cross-origin
    pub fn deny_all() -> Self {
        Self::default()
    }

    pub fn contains(&self, origin: &str) -> bool {
        self.0.contains(origin)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Token and rate-limit settings
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Lifetime of issued tokens
    pub token_ttl: Duration,
    /// How far in the future a token's `iat` may be
    pub clock_skew: Duration,
    pub rate_limit: RateLimitConfig,
    /// Reverse proxies whose `X-Forwarded-For` is used for rate-limit keys
    pub trusted_proxies: TrustedProxies,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_ttl: Duration::from_secs(3600),
            clock_skew: Duration::from_secs(30),
            rate_limit: RateLimitConfig::default(),
            trusted_proxies: TrustedProxies::none(),
        }
    }
}

/// Everything `SecretProvider::load` resolves
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub mode: AppMode,
    pub signing_secret: Arc<SigningSecret>,
    pub allowed_origins: AllowedOrigins,
    pub auth: AuthConfig,
}

/// Reads security settings through a lookup function.
///
/// `SecretProvider::from_env()` reads the process environment; tests pass a
/// closure over a map instead.
pub struct SecretProvider<F> {
    lookup: F,
    mode: AppMode,
}

impl SecretProvider<fn(&str) -> Option<String>> {
    pub fn from_env() -> Self {
        Self::new(env::process_env as fn(&str) -> Option<String>)
    }
}

impl<F> SecretProvider<F>
where
    F: Fn(&str) -> Option<String>,
{
    pub fn new(lookup: F) -> Self {
        let mode = AppMode::from_lookup(&lookup);
        Self { lookup, mode }
    }

    pub fn mode(&self) -> AppMode {
        self.mode
    }

    /// Fails if the secret is absent, blank, or under 32 characters
    pub fn signing_secret(&self) -> Result<SigningSecret, ConfigError> {
        let raw = env::required(&self.lookup, TOKEN_SECRET_VAR).map_err(|_| {
            ConfigError::MissingSecret {
                var: TOKEN_SECRET_VAR,
            }
        })?;
        SigningSecret::new(raw)
    }

    /// Configured list, else the development defaults, else (production) nothing
    pub fn allowed_origins(&self) -> AllowedOrigins {
        match env::optional(&self.lookup, CORS_ORIGINS_VAR) {
            Some(raw) => AllowedOrigins::new(env::split_list(&raw)),
            None if self.mode.is_production() => AllowedOrigins::deny_all(),
            None => AllowedOrigins::new(DEVELOPMENT_ORIGINS.iter().copied()),
        }
    }

    pub fn auth_config(&self) -> Result<AuthConfig, ConfigError> {
        let defaults = AuthConfig::default();

        let ttl_secs = env::parse_or(&self.lookup, TOKEN_TTL_VAR, defaults.token_ttl.as_secs())?;
        if ttl_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                name: TOKEN_TTL_VAR,
                reason: "token lifetime must be positive".to_string(),
            });
        }

        let skew_secs =
            env::parse_or(&self.lookup, CLOCK_SKEW_VAR, defaults.clock_skew.as_secs())?;
        let clock_skew = Duration::from_secs(skew_secs);
        if clock_skew > MAX_CLOCK_SKEW {
            return Err(ConfigError::InvalidSetting {
                name: CLOCK_SKEW_VAR,
                reason: format!("must be at most {} seconds", MAX_CLOCK_SKEW.as_secs()),
            });
        }

        let max_requests = env::parse_or(
            &self.lookup,
            RATE_LIMIT_MAX_VAR,
            defaults.rate_limit.max_requests,
        )?;
        let window_secs = env::parse_or(
            &self.lookup,
            RATE_LIMIT_WINDOW_VAR,
            defaults.rate_limit.window.as_secs(),
        )?;
        if max_requests == 0 || window_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                name: RATE_LIMIT_MAX_VAR,
                reason: "rate limit and window must be positive".to_string(),
            });
        }

        Ok(AuthConfig {
            token_ttl: Duration::from_secs(ttl_secs),
            clock_skew,
            rate_limit: RateLimitConfig::new(max_requests, window_secs),
            trusted_proxies: TrustedProxies::from_lookup(&self.lookup)?,
        })
    }

    /// Resolve everything at once; any error must abort startup
    pub fn load(&self) -> Result<SecurityConfig, ConfigError> {
        let config = SecurityConfig {
            mode: self.mode,
            signing_secret: Arc::new(self.signing_secret()?),
            allowed_origins: self.allowed_origins(),
            auth: self.auth_config()?,
        };

        tracing::info!(
            mode = ?config.mode,
            allowed_origins = config.allowed_origins.len(),
            token_ttl_secs = config.auth.token_ttl.as_secs(),
            trusted_proxies = config.auth.trusted_proxies.len(),
            "Security configuration loaded"
        );
        if config.mode.is_production() && config.allowed_origins.is_empty() {
            tracing::warn!("No CORS origins configured; all cross-origin requests will be rejected");
        }

        Ok(config)
    }
}
