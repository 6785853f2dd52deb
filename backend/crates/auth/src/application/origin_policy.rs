//! Origin Policy
//!
//! Decides whether a cross-origin request may proceed.

use std::sync::Arc;

use crate::application::config::AllowedOrigins;

#[derive(Debug, Clone)]
pub struct OriginPolicy {
    allowed: Arc<AllowedOrigins>,
}

impl OriginPolicy {
    pub fn new(allowed: AllowedOrigins) -> Self {
        Self {
            allowed: Arc::new(allowed),
        }
    }

    /// No `Origin` header (same-origin or non-browser client) is allowed.
    /// Otherwise the origin must appear verbatim in the allow-list: no
    /// wildcards, no subdomain or trailing-slash matching.
    pub fn is_allowed(&self, origin: Option<&str>) -> bool {
        match origin {
            None => true,
            Some(origin) => self.allowed.contains(origin),
        }
    }
}
