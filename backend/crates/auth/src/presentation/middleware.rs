//! Request Pipeline Middleware
//!
//! Stages in the order a request meets them:
//! 1. `enforce_origin`: disallowed `Origin` gets an empty 403
//! 2. `cors_layer`: CORS headers and preflight for allowed origins
//! 3. `rate_limit`: per-client fixed window, 429 when exhausted
//! 4. `require_identity` (AuthGate): bearer token → `Identity` extension
//! 5. `require_role` (RoleGate): `Identity.role` must be in the route's set
//!
//! Routes opt in to 4 and 5 through [`RouteGates`].

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::{ConnectInfo, FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, Method, Request, StatusCode, header};
use axum::middleware::{Next, from_fn_with_state};
use axum::response::{IntoResponse, Response};
use kernel::error::app_error::AppError;
use platform::client::{TrustedProxies, client_key};
use platform::rate_limit::{RateLimitConfig, RateLimitStore, now_ms};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::application::origin_policy::OriginPolicy;
use crate::application::token_service::TokenService;
use crate::domain::entity::identity::Identity;
use crate::domain::value_object::role_set::RoleSet;
use crate::error::AuthError;

// ============================================================================
// AuthGate
// ============================================================================

/// Token from `Authorization: <scheme> <token>`.
///
/// Only the second space-separated field is read; the scheme word is not
/// checked. A header without a non-empty second field yields `None`.
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(' ').nth(1))
        .filter(|token| !token.is_empty())
}

/// AuthGate: verify the bearer token and attach the caller's `Identity`
pub async fn require_identity(
    State(tokens): State<Arc<TokenService>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let token = extract_bearer(req.headers()).ok_or(AuthError::MissingToken)?;
    let identity = tokens.verify(token)?;

    tracing::debug!(user_id = %identity.user_id, role = %identity.role, "Request authenticated");

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

// ============================================================================
// RoleGate
// ============================================================================

/// RoleGate: pass only identities whose role is in `allowed`
pub async fn require_role(
    State(allowed): State<RoleSet>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let identity = req
        .extensions()
        .get::<Identity>()
        .ok_or(AuthError::NoRole)?;

    if !allowed.contains(identity.role) {
        tracing::debug!(
            user_id = %identity.user_id,
            role = %identity.role,
            allowed = %allowed,
            "Role not in route's allowed set"
        );
        return Err(AuthError::Forbidden);
    }

    Ok(next.run(req).await)
}

/// Per-route gate registration.
///
/// `route_layer` wraps outside-in, so the call added last runs first:
/// write `.authorize(roles).authenticate(tokens)` to get AuthGate before
/// RoleGate. Call after the routes are added.
pub trait RouteGates {
    /// Attach RoleGate with an allowed-role set
    fn authorize(self, allowed: RoleSet) -> Self;

    /// Attach AuthGate
    fn authenticate(self, tokens: Arc<TokenService>) -> Self;
}

impl<S> RouteGates for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn authorize(self, allowed: RoleSet) -> Self {
        self.route_layer(from_fn_with_state(allowed, require_role))
    }

    fn authenticate(self, tokens: Arc<TokenService>) -> Self {
        self.route_layer(from_fn_with_state(tokens, require_identity))
    }
}

/// Handlers behind AuthGate take the caller as an argument
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or(AuthError::MissingToken)
    }
}

// ============================================================================
// OriginPolicy
// ============================================================================

/// Reject requests whose `Origin` is not allow-listed.
///
/// The response is a bare 403 so the allow-list cannot be mapped out.
pub async fn enforce_origin(
    State(policy): State<OriginPolicy>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let allowed = match req.headers().get(header::ORIGIN) {
        None => true,
        Some(value) => value
            .to_str()
            .map(|origin| policy.is_allowed(Some(origin)))
            .unwrap_or(false),
    };

    if !allowed {
        tracing::warn!(
            origin = ?req.headers().get(header::ORIGIN),
            path = %req.uri().path(),
            "Cross-origin request rejected"
        );
        return (StatusCode::FORBIDDEN, ()).into_response();
    }

    next.run(req).await
}

/// CORS response headers for allow-listed origins
pub fn cors_layer(policy: &OriginPolicy) -> CorsLayer {
    let policy = policy.clone();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin
                    .to_str()
                    .map(|origin| policy.is_allowed(Some(origin)))
                    .unwrap_or(false)
            },
        ))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
        .max_age(Duration::from_secs(24 * 3600))
}

// ============================================================================
// Rate limiting
// ============================================================================

/// Middleware state
pub struct RateLimiter<L> {
    pub store: Arc<L>,
    pub config: Arc<RateLimitConfig>,
    pub trusted_proxies: Arc<TrustedProxies>,
}

impl<L> RateLimiter<L> {
    /// Keys every request on its socket peer address
    pub fn new(store: Arc<L>, config: RateLimitConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
            trusted_proxies: Arc::new(TrustedProxies::none()),
        }
    }

    /// Read `X-Forwarded-For` from requests arriving through these proxies
    pub fn with_trusted_proxies(mut self, proxies: TrustedProxies) -> Self {
        self.trusted_proxies = Arc::new(proxies);
        self
    }
}

impl<L> Clone for RateLimiter<L> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            config: self.config.clone(),
            trusted_proxies: self.trusted_proxies.clone(),
        }
    }
}

/// Count the request against its client's window.
///
/// A failing store lets the request through rather than locking every
/// client out.
pub async fn rate_limit<L>(
    State(limiter): State<RateLimiter<L>>,
    req: Request<Body>,
    next: Next,
) -> Response
where
    L: RateLimitStore + Sync + 'static,
{
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());
    let key = client_key(req.headers(), peer, &limiter.trusted_proxies);

    let result = match limiter.store.check_and_increment(&key, &limiter.config).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, "Rate limit check failed; allowing request");
            return next.run(req).await;
        }
    };

    if !result.allowed {
        let retry_after = result.retry_after_secs(now_ms());
        tracing::warn!(client = %key, retry_after, "Rate limit exceeded");

        let mut response = AppError::too_many_requests("Too many requests")
            .with_action("Please wait before retrying")
            .into_response();
        let headers = response.headers_mut();
        headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
        headers.insert("x-ratelimit-limit", HeaderValue::from(limiter.config.max_requests));
        headers.insert("x-ratelimit-remaining", HeaderValue::from(0u32));
        return response;
    }

    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    headers.insert("x-ratelimit-limit", HeaderValue::from(limiter.config.max_requests));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(result.remaining));
    response
}
