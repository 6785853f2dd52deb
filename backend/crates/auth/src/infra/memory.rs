//! In-Memory Credential Store
//!
//! Process-local store for tests and database-less local runs. Accounts
//! vanish when the process exits.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::domain::entity::user::User;
use crate::domain::repository::CredentialStore;
use crate::domain::value_object::{
    login_identifier::LoginIdentifier,
    user_id::UserId,
    user_password::{PasswordAttempt, UserPassword},
};
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_identifier(&self, identifier: &LoginIdentifier) -> AuthResult<Option<User>> {
        let users = self.users.read().await;
        let found = users.values().find(|user| match identifier {
            LoginIdentifier::UserName(name) => user.user_name.as_str().eq_ignore_ascii_case(name),
            LoginIdentifier::Email(email) => user.email.as_str() == email,
        });
        Ok(found.cloned())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut users = self.users.write().await;

        if users.contains_key(&user.user_id) {
            return Err(AuthError::Internal("duplicate user id".to_string()));
        }
        check_unique(&users, user)?;

        users.insert(user.user_id.clone(), user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let mut users = self.users.write().await;

        if !users.contains_key(&user.user_id) {
            return Err(AuthError::UserNotFound);
        }
        check_unique(&users, user)?;

        users.insert(user.user_id.clone(), user.clone());
        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> AuthResult<()> {
        match self.users.write().await.remove(user_id) {
            Some(_) => Ok(()),
            None => Err(AuthError::UserNotFound),
        }
    }

    fn compare_password_hash(&self, hash: &UserPassword, attempt: &PasswordAttempt) -> bool {
        hash.verify(attempt)
    }
}

/// Name and email must not be used by any other account
fn check_unique(users: &HashMap<UserId, User>, user: &User) -> AuthResult<()> {
    for existing in users.values().filter(|u| u.user_id != user.user_id) {
        if existing
            .user_name
            .as_str()
            .eq_ignore_ascii_case(user.user_name.as_str())
        {
            return Err(AuthError::UserNameTaken);
        }
        if existing.email == user.email {
            return Err(AuthError::EmailTaken);
        }
    }
    Ok(())
}
