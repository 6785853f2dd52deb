//! Entity Module

pub mod identity;
pub mod token_claims;
pub mod user;

pub use identity::Identity;
pub use token_claims::TokenClaims;
pub use user::User;
