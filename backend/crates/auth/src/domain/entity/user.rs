//! User Entity
//!
//! An account as the credential store keeps it.

use chrono::{DateTime, Utc};

use crate::domain::entity::identity::Identity;
use crate::domain::value_object::{
    club_id::ClubId, email::Email, user_id::UserId, user_name::UserName,
    user_password::UserPassword, user_role::UserRole,
};

#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    /// Unique, case-insensitive
    pub user_name: UserName,
    /// Unique, stored lowercase
    pub email: Email,
    pub password: UserPassword,
    pub role: UserRole,
    pub club_id: Option<ClubId>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        user_name: UserName,
        email: Email,
        password: UserPassword,
        role: UserRole,
        club_id: Option<ClubId>,
    ) -> Self {
        Self {
            user_id: UserId::generate(),
            user_name,
            email,
            password,
            role,
            club_id,
            created_at: Utc::now(),
        }
    }

    /// Token subject for this account
    pub fn identity(&self) -> Identity {
        Identity::new(self.user_id.clone(), self.role, self.club_id.clone())
    }
}
