//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and middleware.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::AuthAppState;
pub use middleware::{
    RateLimiter, RouteGates, cors_layer, enforce_origin, extract_bearer, rate_limit,
    require_identity, require_role,
};
pub use router::{app_router, auth_router, users_router};
