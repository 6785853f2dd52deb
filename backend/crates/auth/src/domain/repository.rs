//! Repository Traits
//!
//! Interfaces for data persistence. Implementations live in the infra layer.

use crate::domain::entity::user::User;
use crate::domain::value_object::{
    login_identifier::LoginIdentifier,
    user_id::UserId,
    user_password::{PasswordAttempt, UserPassword},
};
use crate::error::AuthResult;

/// Where accounts and their password hashes live
#[trait_variant::make(CredentialStore: Send)]
pub trait LocalCredentialStore {
    /// Look up by user name (case-insensitive) or email
    async fn find_by_identifier(&self, identifier: &LoginIdentifier) -> AuthResult<Option<User>>;

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Persist a new account.
    ///
    /// Fails with `UserNameTaken` or `EmailTaken` when either is already in use.
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Replace the stored account with the same id.
    ///
    /// `UserNotFound` if there is none; `UserNameTaken` / `EmailTaken` if
    /// another account already uses the new name or email.
    async fn update(&self, user: &User) -> AuthResult<()>;

    /// Remove an account. `UserNotFound` if there is none.
    async fn delete(&self, user_id: &UserId) -> AuthResult<()>;

    /// Check a sign-in attempt against a stored hash.
    ///
    /// Argon2 work: call from a blocking context.
    fn compare_password_hash(&self, hash: &UserPassword, attempt: &PasswordAttempt) -> bool;
}
