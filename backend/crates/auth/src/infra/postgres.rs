//! PostgreSQL Credential Store

use chrono::{DateTime, Utc};
use kernel::error::{app_error::OptionExt, kind::ErrorKind};
use sqlx::PgPool;

use crate::domain::entity::user::User;
use crate::domain::repository::CredentialStore;
use crate::domain::value_object::{
    club_id::ClubId, email::Email, login_identifier::LoginIdentifier, user_id::UserId,
    user_name::UserName, user_password::{PasswordAttempt, UserPassword}, user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

const USER_COLUMNS: &str =
    "user_id, user_name, email, password_hash, user_role, club_id, created_at";

/// PostgreSQL-backed credential store over the `users` table
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CredentialStore for PgCredentialStore {
    async fn find_by_identifier(&self, identifier: &LoginIdentifier) -> AuthResult<Option<User>> {
        let sql = match identifier {
            LoginIdentifier::UserName(_) => {
                format!("SELECT {USER_COLUMNS} FROM users WHERE lower(user_name) = lower($1)")
            }
            LoginIdentifier::Email(_) => {
                format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1")
            }
        };

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(identifier.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user_id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn create(&self, user: &User) -> AuthResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                user_name,
                email,
                password_hash,
                user_role,
                club_id,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.user_id.as_str())
        .bind(user.user_name.as_str())
        .bind(user.email.as_str())
        .bind(user.password.as_phc_string())
        .bind(user.role.code())
        .bind(user.club_id.as_ref().map(ClubId::as_str))
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        result.map(|_| ()).map_err(map_write_error)
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                user_name = $2,
                email = $3,
                password_hash = $4,
                user_role = $5,
                club_id = $6
            WHERE user_id = $1
            "#,
        )
        .bind(user.user_id.as_str())
        .bind(user.user_name.as_str())
        .bind(user.email.as_str())
        .bind(user.password.as_phc_string())
        .bind(user.role.code())
        .bind(user.club_id.as_ref().map(ClubId::as_str))
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> AuthResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }

    fn compare_password_hash(&self, hash: &UserPassword, attempt: &PasswordAttempt) -> bool {
        hash.verify(attempt)
    }
}

/// Unique violations become the matching conflict
fn map_write_error(e: sqlx::Error) -> AuthError {
    match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => match db.constraint() {
            Some("users_email_key") => AuthError::EmailTaken,
            _ => AuthError::UserNameTaken,
        },
        e => e.into(),
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: String,
    user_name: String,
    email: String,
    password_hash: String,
    user_role: String,
    club_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let role = UserRole::from_code(&self.user_role).ok_or_app_err(
            ErrorKind::InternalServerError,
            format!("Unknown role in users table: {}", self.user_role),
        )?;

        Ok(User {
            user_id: UserId::new(self.user_id),
            user_name: UserName::from_db(self.user_name),
            email: Email::from_db(self.email),
            password: UserPassword::from_phc_string(self.password_hash)?,
            role,
            club_id: ClubId::parse(self.club_id.as_deref()),
            created_at: self.created_at,
        })
    }
}
