//! Routers
//!
//! `auth_router` and `users_router` are mounted by `app_router`, which adds
//! the request-wide stages (trace, origin, CORS, rate limit) around them.

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use platform::rate_limit::RateLimitStore;
use tower_http::trace::TraceLayer;

use crate::application::origin_policy::OriginPolicy;
use crate::domain::repository::CredentialStore;
use crate::domain::value_object::{role_set::RoleSet, user_role::UserRole};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{
    RateLimiter, RouteGates, cors_layer, enforce_origin, rate_limit,
};

/// May create, edit and delete accounts
pub const USER_MANAGERS: RoleSet =
    RoleSet::from_slice(&[UserRole::SuperAdmin, UserRole::ClubAdmin]);

/// May read any account
pub const USER_READERS: RoleSet =
    RoleSet::from_slice(&[UserRole::SuperAdmin, UserRole::ClubAdmin, UserRole::Coach]);

/// `/register`, `/login` (public) and `/refresh`, `/logout`, `/me` (AuthGate)
pub fn auth_router<R>(state: AuthAppState<R>) -> Router
where
    R: CredentialStore + Send + Sync + 'static,
{
    let public = Router::new()
        .route("/register", post(handlers::register::<R>))
        .route("/login", post(handlers::login::<R>));

    let authenticated = Router::new()
        .route("/refresh", post(handlers::refresh::<R>))
        .route("/logout", post(handlers::logout))
        .route("/me", get(handlers::me))
        .authenticate(state.tokens.clone());

    public.merge(authenticated).with_state(state)
}

/// `/users` and `/users/{id}`, each behind AuthGate and its own RoleGate.
///
/// Reads and writes on `/users/{id}` are separate routers so each method
/// gets its own role set.
pub fn users_router<R>(state: AuthAppState<R>) -> Router
where
    R: CredentialStore + Send + Sync + 'static,
{
    let create = Router::new()
        .route("/users", post(handlers::create_user::<R>))
        .authorize(USER_MANAGERS)
        .authenticate(state.tokens.clone());

    let read = Router::new()
        .route("/users/{id}", get(handlers::get_user::<R>))
        .authorize(USER_READERS)
        .authenticate(state.tokens.clone());

    let manage = Router::new()
        .route(
            "/users/{id}",
            put(handlers::update_user::<R>).delete(handlers::delete_user::<R>),
        )
        .authorize(USER_MANAGERS)
        .authenticate(state.tokens.clone());

    create.merge(read).merge(manage).with_state(state)
}

/// Full application router.
///
/// Request order: trace → origin check → CORS → rate limit → route gates →
/// handler.
pub fn app_router<R, L>(
    state: AuthAppState<R>,
    origins: OriginPolicy,
    limiter: RateLimiter<L>,
) -> Router
where
    R: CredentialStore + Send + Sync + 'static,
    L: RateLimitStore + Sync + 'static,
{
    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/auth", auth_router(state.clone()))
        .nest("/api", users_router(state))
        .layer(from_fn_with_state(limiter, rate_limit::<L>))
        .layer(cors_layer(&origins))
        .layer(from_fn_with_state(origins, enforce_origin))
        .layer(TraceLayer::new_for_http())
}
