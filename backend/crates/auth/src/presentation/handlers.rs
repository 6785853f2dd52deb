//! HTTP Handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::token_service::TokenService;
use crate::application::{
    ManageUserUseCase, SignInInput, SignInUseCase, SignUpInput, SignUpUseCase, UpdateUserInput,
};
use crate::domain::entity::identity::Identity;
use crate::domain::repository::CredentialStore;
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    CreateUserRequest, HealthResponse, IdentityResponse, LoginRequest, RegisterRequest,
    TokenResponse, UpdateUserRequest, UserResponse,
};

/// Shared state for auth and user handlers
pub struct AuthAppState<R>
where
    R: CredentialStore + Send + Sync + 'static,
{
    pub store: Arc<R>,
    pub tokens: Arc<TokenService>,
    pub config: Arc<AuthConfig>,
}

impl<R> Clone for AuthAppState<R>
where
    R: CredentialStore + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            tokens: self.tokens.clone(),
            config: self.config.clone(),
        }
    }
}

// ============================================================================
// Registration
// ============================================================================

/// POST /api/auth/register
pub async fn register<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: CredentialStore + Send + Sync + 'static,
{
    let use_case = SignUpUseCase::new(state.store.clone());

    let user = use_case
        .register(SignUpInput {
            user_name: req.user_name,
            email: req.email,
            password: req.password,
            role: req.role,
            club_id: None,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

// ============================================================================
// Sign In / tokens
// ============================================================================

/// POST /api/auth/login
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<Json<TokenResponse>>
where
    R: CredentialStore + Send + Sync + 'static,
{
    let use_case = SignInUseCase::new(
        state.store.clone(),
        state.tokens.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(SignInInput {
            identifier: req.identifier,
            password: req.password,
        })
        .await?;

    Ok(Json(TokenResponse::new(output.token, Some(&output.user))))
}

/// POST /api/auth/refresh
///
/// Fresh token for the caller's current token claims.
pub async fn refresh<R>(
    State(state): State<AuthAppState<R>>,
    identity: Identity,
) -> AuthResult<Json<TokenResponse>>
where
    R: CredentialStore + Send + Sync + 'static,
{
    let issued = state.tokens.issue(&identity, state.config.token_ttl)?;
    tracing::debug!(user_id = %identity.user_id, "Token refreshed");
    Ok(Json(TokenResponse::new(issued, None)))
}

/// POST /api/auth/logout
///
/// Tokens are not revocable; the client drops its copy.
pub async fn logout(identity: Identity) -> StatusCode {
    tracing::info!(user_id = %identity.user_id, "User signed out");
    StatusCode::NO_CONTENT
}

/// GET /api/auth/me
pub async fn me(identity: Identity) -> Json<IdentityResponse> {
    Json(IdentityResponse::from(&identity))
}

// ============================================================================
// Users
// ============================================================================

/// POST /api/users
pub async fn create_user<R>(
    State(state): State<AuthAppState<R>>,
    identity: Identity,
    Json(req): Json<CreateUserRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: CredentialStore + Send + Sync + 'static,
{
    let use_case = SignUpUseCase::new(state.store.clone());

    let user = use_case
        .create_by(
            &identity,
            SignUpInput {
                user_name: req.user_name,
                email: req.email,
                password: req.password,
                role: req.role,
                club_id: req.club_id,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// GET /api/users/{id}
pub async fn get_user<R>(
    State(state): State<AuthAppState<R>>,
    Path(id): Path<String>,
) -> AuthResult<Json<UserResponse>>
where
    R: CredentialStore + Send + Sync + 'static,
{
    let user = state
        .store
        .find_by_id(&UserId::new(id))
        .await?
        .ok_or(AuthError::UserNotFound)?;

    Ok(Json(UserResponse::from(&user)))
}

/// PUT /api/users/{id}
pub async fn update_user<R>(
    State(state): State<AuthAppState<R>>,
    identity: Identity,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> AuthResult<Json<UserResponse>>
where
    R: CredentialStore + Send + Sync + 'static,
{
    let use_case = ManageUserUseCase::new(state.store.clone());

    let user = use_case
        .update_by(
            &identity,
            &UserId::new(id),
            UpdateUserInput {
                user_name: req.user_name,
                email: req.email,
                password: req.password,
                role: req.role,
                club_id: req.club_id,
            },
        )
        .await?;

    Ok(Json(UserResponse::from(&user)))
}

/// DELETE /api/users/{id}
pub async fn delete_user<R>(
    State(state): State<AuthAppState<R>>,
    identity: Identity,
    Path(id): Path<String>,
) -> AuthResult<StatusCode>
where
    R: CredentialStore + Send + Sync + 'static,
{
    ManageUserUseCase::new(state.store.clone())
        .delete_by(&identity, &UserId::new(id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Health
// ============================================================================

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
