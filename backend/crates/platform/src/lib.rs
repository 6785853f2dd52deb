//! Platform Crate - Technical Infrastructure
//!
//! Building blocks with no knowledge of clubs, users or roles:
//! - Cryptographic utilities (HMAC-SHA256 sign and verify, Base64url)
//! - Password hashing (Argon2id, NIST SP 800-63B policy)
//! - Client identification for rate-limit keys (trusted-proxy aware)
//! - Rate limiting (store trait + in-memory fixed window)
//! - Environment configuration helpers

pub mod client;
pub mod config;
pub mod crypto;
pub mod password;
pub mod rate_limit;
