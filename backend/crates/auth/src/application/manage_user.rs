//! Manage User Use Case
//!
//! Administrative edits and removal of existing accounts.
//!
//! A SuperAdmin may manage any account. A ClubAdmin may only manage
//! accounts in their own club, never a SuperAdmin, and may not move an
//! account out of that club or promote it to SuperAdmin.

use std::sync::Arc;

use crate::application::blocking::hash_password;
use crate::application::sign_up::parse_role;
use crate::domain::entity::{identity::Identity, user::User};
use crate::domain::repository::CredentialStore;
use crate::domain::value_object::{
    club_id::ClubId, email::Email, user_id::UserId, user_name::UserName,
    user_password::NewPassword, user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

/// Fields to change; `None` keeps the stored value
#[derive(Debug, Default)]
pub struct UpdateUserInput {
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    /// A blank value removes the account from its club
    pub club_id: Option<String>,
}

pub struct ManageUserUseCase<S>
where
    S: CredentialStore,
{
    store: Arc<S>,
}

impl<S> ManageUserUseCase<S>
where
    S: CredentialStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn update_by(
        &self,
        actor: &Identity,
        user_id: &UserId,
        input: UpdateUserInput,
    ) -> AuthResult<User> {
        let mut user = self.load_managed(actor, user_id).await?;

        if let Some(user_name) = input.user_name {
            user.user_name = UserName::new(user_name)?;
        }
        if let Some(email) = input.email {
            user.email = Email::new(email)?;
        }
        if let Some(code) = input.role.as_deref().filter(|c| !c.trim().is_empty()) {
            let role = parse_role(Some(code))?;
            if actor.role != UserRole::SuperAdmin && role == UserRole::SuperAdmin {
                return Err(AuthError::RoleNotAssignable(role));
            }
            user.role = role;
        }
        if let Some(club) = input.club_id {
            let club_id = ClubId::parse(Some(&club));
            if actor.role != UserRole::SuperAdmin && club_id != actor.club_id {
                return Err(AuthError::Forbidden);
            }
            user.club_id = club_id;
        }
        if let Some(password) = input.password {
            user.password = hash_password(NewPassword::new(password)?).await?;
        }

        self.store.update(&user).await?;

        tracing::info!(
            user_id = %user.user_id,
            role = %user.role,
            updated_by = %actor.user_id.as_str(),
            "User updated"
        );

        Ok(user)
    }

    pub async fn delete_by(&self, actor: &Identity, user_id: &UserId) -> AuthResult<()> {
        let user = self.load_managed(actor, user_id).await?;
        self.store.delete(&user.user_id).await?;

        tracing::info!(
            user_id = %user.user_id,
            deleted_by = %actor.user_id.as_str(),
            "User deleted"
        );

        Ok(())
    }

    /// Fetch the target and check the actor may manage it
    async fn load_managed(&self, actor: &Identity, user_id: &UserId) -> AuthResult<User> {
        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        match actor.role {
            UserRole::SuperAdmin => Ok(user),
            UserRole::ClubAdmin
                if user.role != UserRole::SuperAdmin
                    && user.club_id.is_some()
                    && user.club_id == actor.club_id =>
            {
                Ok(user)
            }
            _ => Err(AuthError::Forbidden),
        }
    }
}
