//! Sign Up Use Case
//!
//! Account creation, either by the user themself (public registration) or
//! by an administrator on someone else's behalf.
//!
//! ## Role rules
//! - Self-registration may only pick a self-assignable role (Coach, Player,
//!   Referee, Fan) and never joins a club; default Coach.
//! - A SuperAdmin may create any role in any club.
//! - A ClubAdmin may create anything but SuperAdmin, only inside their own
//!   club; the new account joins the admin's club when none is given.

use std::sync::Arc;

use crate::application::blocking::hash_password;
use crate::domain::entity::{identity::Identity, user::User};
use crate::domain::repository::CredentialStore;
use crate::domain::value_object::{
    club_id::ClubId,
    email::Email,
    user_name::UserName,
    user_password::NewPassword,
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};
use kernel::error::app_error::AppError;

/// Role assigned when a registration does not name one
pub const DEFAULT_ROLE: UserRole = UserRole::Coach;

pub struct SignUpInput {
    pub user_name: String,
    pub email: Option<String>,
    pub password: String,
    /// Role code, see `UserRole::from_code`
    pub role: Option<String>,
    pub club_id: Option<String>,
}

pub struct SignUpUseCase<S>
where
    S: CredentialStore,
{
    store: Arc<S>,
}

impl<S> SignUpUseCase<S>
where
    S: CredentialStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Public self-registration
    pub async fn register(&self, input: SignUpInput) -> AuthResult<User> {
        let role = parse_role(input.role.as_deref())?;
        if !role.is_self_assignable() {
            return Err(AuthError::RoleNotAssignable(role));
        }
        self.create(input, role, None, None).await
    }

    /// Account created by an authenticated administrator
    pub async fn create_by(&self, actor: &Identity, input: SignUpInput) -> AuthResult<User> {
        let role = parse_role(input.role.as_deref())?;
        let requested_club = ClubId::parse(input.club_id.as_deref());

        let club_id = match actor.role {
            UserRole::SuperAdmin => requested_club,
            UserRole::ClubAdmin => {
                if role == UserRole::SuperAdmin {
                    return Err(AuthError::RoleNotAssignable(role));
                }
                match (requested_club, &actor.club_id) {
                    (Some(requested), Some(own)) if requested != *own => {
                        return Err(AuthError::Forbidden);
                    }
                    (Some(requested), None) => Some(requested),
                    (_, own) => own.clone(),
                }
            }
            _ => return Err(AuthError::Forbidden),
        };

        self.create(input, role, club_id, Some(actor)).await
    }

    async fn create(
        &self,
        input: SignUpInput,
        role: UserRole,
        club_id: Option<ClubId>,
        actor: Option<&Identity>,
    ) -> AuthResult<User> {
        let user_name = UserName::new(input.user_name)?;
        let email = match input.email.as_deref().map(str::trim) {
            Some(email) if !email.is_empty() => Email::new(email)?,
            _ => Email::placeholder_for(user_name.as_str()),
        };
        let password = hash_password(NewPassword::new(input.password)?).await?;

        let user = User::new(user_name, email, password, role, club_id);
        self.store.create(&user).await?;

        tracing::info!(
            user_id = %user.user_id,
            role = %user.role,
            created_by = actor.map(|a| a.user_id.as_str()),
            "User created"
        );

        Ok(user)
    }
}

pub(crate) fn parse_role(code: Option<&str>) -> AuthResult<UserRole> {
    match code.map(str::trim).filter(|c| !c.is_empty()) {
        None => Ok(DEFAULT_ROLE),
        Some(code) => UserRole::from_code(code).ok_or_else(|| {
            AuthError::Invalid(
                AppError::bad_request(format!("Unknown role: {code}"))
                    .with_action("Use one of coach, player, club_admin, referee, fan, super_admin"),
            )
        }),
    }
}
