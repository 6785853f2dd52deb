//! Value Object Module

pub mod club_id;
pub mod email;
pub mod login_identifier;
pub mod role_set;
pub mod user_id;
pub mod user_name;
pub mod user_password;
pub mod user_role;

pub use club_id::ClubId;
pub use email::Email;
pub use login_identifier::LoginIdentifier;
pub use role_set::{RoleSet, RoleSetError};
pub use user_id::UserId;
pub use user_name::UserName;
pub use user_password::{NewPassword, PasswordAttempt, UserPassword};
pub use user_role::UserRole;
