//! Token Claims
//!
//! JSON payload carried by a signed bearer token.

use serde::{Deserialize, Serialize};

use crate::domain::entity::identity::Identity;
use crate::domain::value_object::{club_id::ClubId, user_id::UserId, user_role::UserRole};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub club: Option<String>,
    /// Issued at, Unix seconds
    pub iat: i64,
    /// Expires at, Unix seconds
    pub exp: i64,
}

impl TokenClaims {
    pub fn for_identity(identity: &Identity, iat: i64, exp: i64) -> Self {
        Self {
            sub: identity.user_id.as_str().to_string(),
            role: identity.role,
            club: identity.club_id.as_ref().map(|c| c.as_str().to_string()),
            iat,
            exp,
        }
    }

    /// `None` when the subject is blank
    pub fn into_identity(self) -> Option<Identity> {
        if self.sub.trim().is_empty() {
            return None;
        }
        Some(Identity::new(
            UserId::new(self.sub),
            self.role,
            ClubId::parse(self.club.as_deref()),
        ))
    }
}
