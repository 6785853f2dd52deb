//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::application::token_service::IssuedToken;
use crate::domain::entity::{identity::Identity, user::User};
use crate::domain::value_object::user_role::UserRole;

// ============================================================================
// Registration / user creation
// ============================================================================

/// POST /api/auth/register
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(alias = "username")]
    pub user_name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
    /// Role code; defaults to coach
    #[serde(default)]
    pub role: Option<String>,
}

/// POST /api/users
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(alias = "username")]
    pub user_name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub club_id: Option<String>,
}

/// PUT /api/users/{id}; omitted fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateUserRequest {
    #[serde(alias = "username")]
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub club_id: Option<String>,
}

/// Public view of an account; never includes the password hash
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub user_name: String,
    pub email: String,
    pub role: UserRole,
    pub club_id: Option<String>,
    /// RFC 3339
    pub created_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.user_id.to_string(),
            user_name: user.user_name.to_string(),
            email: user.email.to_string(),
            role: user.role,
            club_id: user.club_id.as_ref().map(ToString::to_string),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Sign In / tokens
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// User name or email
    #[serde(alias = "username", alias = "email")]
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub token_type: &'static str,
    /// Unix seconds
    pub expires_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
}

impl TokenResponse {
    pub fn new(issued: IssuedToken, user: Option<&User>) -> Self {
        Self {
            expires_at: issued.expires_at.timestamp(),
            token: issued.token.into_inner(),
            token_type: "Bearer",
            user: user.map(UserResponse::from),
        }
    }
}

/// GET /api/auth/me
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityResponse {
    pub id: String,
    pub role: UserRole,
    pub club_id: Option<String>,
}

impl From<&Identity> for IdentityResponse {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.user_id.to_string(),
            role: identity.role,
            club_id: identity.club_id.as_ref().map(ToString::to_string),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
