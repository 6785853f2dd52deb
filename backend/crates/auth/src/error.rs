//! Auth Error Types
//!
//! Auth-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.
//!
//! Token failures all render as the same 401 body and role failures as the
//! same 403 body; the variant is only visible in logs.

use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::value_object::user_role::UserRole;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    /// No `Authorization` header, or no second field in it
    #[error("Missing bearer token")]
    MissingToken,

    /// Not three base64url segments, or the header/claims do not decode
    #[error("Malformed token")]
    Malformed,

    /// Signature does not match the signed text
    #[error("Token signature mismatch")]
    BadSignature,

    #[error("Token expired")]
    Expired,

    /// RoleGate ran without an identity on the request
    #[error("No identity attached to request")]
    NoRole,

    /// Identity's role is not in the route's role set
    #[error("Role not permitted for this route")]
    Forbidden,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User name already exists")]
    UserNameTaken,

    #[error("Email already registered")]
    EmailTaken,

    #[error("User not found")]
    UserNotFound,

    /// The caller may not hand out this role
    #[error("Role {0} cannot be assigned here")]
    RoleNotAssignable(UserRole),

    /// Validation failure from a value object
    #[error(transparent)]
    Invalid(#[from] AppError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::MissingToken
            | AuthError::Malformed
            | AuthError::BadSignature
            | AuthError::Expired
            | AuthError::InvalidCredentials => ErrorKind::Unauthorized,
            AuthError::NoRole | AuthError::Forbidden | AuthError::RoleNotAssignable(_) => {
                ErrorKind::Forbidden
            }
            AuthError::UserNameTaken | AuthError::EmailTaken => ErrorKind::Conflict,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::Invalid(e) => e.kind(),
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// True for the failures of token verification
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            AuthError::MissingToken
                | AuthError::Malformed
                | AuthError::BadSignature
                | AuthError::Expired
        )
    }

    /// Convert to the client-facing error
    pub fn to_app_error(&self) -> AppError {
        match self {
            e if e.is_token_error() => AppError::unauthorized("Unauthorized"),
            AuthError::NoRole | AuthError::Forbidden => AppError::forbidden("Forbidden"),
            AuthError::RoleNotAssignable(_) => AppError::forbidden(self.to_string())
                .with_action("Ask a club administrator to assign this role"),
            AuthError::Invalid(e) => {
                let app = AppError::new(e.kind(), e.message().to_string());
                match e.action() {
                    Some(action) => app.with_action(action.to_string()),
                    None => app,
                }
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    pub(crate) fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::NoRole => {
                // Only reachable when a route is wired with RoleGate but not AuthGate
                tracing::error!("Role check ran without an authenticated identity");
            }
            AuthError::Malformed | AuthError::BadSignature => {
                tracing::warn!(reason = %self, "Rejected bearer token");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::Forbidden | AuthError::RoleNotAssignable(_) => {
                tracing::info!(reason = %self, "Access denied");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        let unauthorized = self.kind() == ErrorKind::Unauthorized;
        let mut response = self.to_app_error().into_response();
        if unauthorized {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
