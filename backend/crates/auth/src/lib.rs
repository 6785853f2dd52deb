//! Auth (Authentication & Authorization) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Identities, roles, accounts, credential store trait
//! - `application/` - Security configuration, token service, origin policy, use cases
//! - `infra/` - Credential store implementations (PostgreSQL, in-memory)
//! - `presentation/` - HTTP handlers, DTOs, pipeline middleware, routers
//!
//! ## Features
//! - Registration and sign-in with user name or email + password
//! - HMAC-SHA256 signed bearer tokens with expiry
//! - Per-route role sets checked after token verification
//! - Origin allow-listing and per-client rate limiting
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (NIST SP 800-63B policy)
//! - Signing secret of at least 32 characters, required at startup
//! - Token failures are indistinguishable to the client (uniform 401)
//! - Roles are flat: a route lists every role it accepts

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::{AuthConfig, ConfigError, SecretProvider, SecurityConfig};
pub use application::origin_policy::OriginPolicy;
pub use application::token_service::TokenService;
pub use error::{AuthError, AuthResult};
pub use infra::{InMemoryCredentialStore, PgCredentialStore};
pub use presentation::router::app_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod store {
    pub use crate::domain::repository::{CredentialStore, LocalCredentialStore};
    pub use crate::infra::{InMemoryCredentialStore, PgCredentialStore};
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
