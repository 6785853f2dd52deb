//! Application Layer
//!
//! Use cases and application services.

mod blocking;
pub mod clock;
pub mod config;
pub mod manage_user;
pub mod origin_policy;
pub mod sign_in;
pub mod sign_up;
pub mod token_service;

// Re-exports
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    AllowedOrigins, AuthConfig, ConfigError, SecretProvider, SecurityConfig, SigningSecret,
};
pub use manage_user::{ManageUserUseCase, UpdateUserInput};
pub use origin_policy::OriginPolicy;
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_up::{SignUpInput, SignUpUseCase};
pub use token_service::{IssuedToken, Token, TokenService};
