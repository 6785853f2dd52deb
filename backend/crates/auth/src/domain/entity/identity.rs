//! Identity
//!
//! Who the caller is, as established by a verified token.

use crate::domain::value_object::{club_id::ClubId, user_id::UserId, user_role::UserRole};

/// Verified caller of a request.
///
/// Only constructed by token verification (or by sign-in just before a token
/// is issued), so holding one means the claims were checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub role: UserRole,
    pub club_id: Option<ClubId>,
}

impl Identity {
    pub fn new(user_id: UserId, role: UserRole, club_id: Option<ClubId>) -> Self {
        Self {
            user_id,
            role,
            club_id,
        }
    }
}
