//! Sign In Use Case
//!
//! Checks credentials against the store and issues a bearer token.

use std::sync::Arc;

use crate::application::blocking::run_blocking;
use crate::application::config::AuthConfig;
use crate::application::token_service::{IssuedToken, TokenService};
use crate::domain::entity::user::User;
use crate::domain::repository::CredentialStore;
use crate::domain::value_object::{
    login_identifier::LoginIdentifier,
    user_password::{PasswordAttempt, UserPassword},
};
use crate::error::{AuthError, AuthResult};

pub struct SignInInput {
    /// User name or email
    pub identifier: String,
    pub password: String,
}

#[derive(Debug)]
pub struct SignInOutput {
    pub token: IssuedToken,
    pub user: User,
}

pub struct SignInUseCase<S>
where
    S: CredentialStore + Send + Sync + 'static,
{
    store: Arc<S>,
    tokens: Arc<TokenService>,
    config: Arc<AuthConfig>,
}

impl<S> SignInUseCase<S>
where
    S: CredentialStore + Send + Sync + 'static,
{
    pub fn new(store: Arc<S>, tokens: Arc<TokenService>, config: Arc<AuthConfig>) -> Self {
        Self {
            store,
            tokens,
            config,
        }
    }

    /// Unknown account and wrong password both fail with `InvalidCredentials`.
    ///
    /// A miss is still compared against a stand-in hash, so both failures do
    /// the same Argon2 work.
    pub async fn execute(&self, input: SignInInput) -> AuthResult<SignInOutput> {
        let attempt = PasswordAttempt::new(input.password);

        let user = match LoginIdentifier::parse(&input.identifier) {
            Some(identifier) => self.store.find_by_identifier(&identifier).await?,
            None => None,
        };

        let store = self.store.clone();
        let (user, matched) = run_blocking(move || {
            let hash = match &user {
                Some(user) => Some(&user.password),
                None => UserPassword::unknown_account(),
            };
            let matched = match hash {
                Some(hash) => store.compare_password_hash(hash, &attempt),
                None => false,
            };
            (user, matched)
        })
        .await?;

        let user = match user {
            Some(user) if matched => user,
            _ => return Err(AuthError::InvalidCredentials),
        };

        let token = self.tokens.issue(&user.identity(), self.config.token_ttl)?;

        tracing::info!(user_id = %user.user_id, role = %user.role, "User signed in");

        Ok(SignInOutput { token, user })
    }
}
