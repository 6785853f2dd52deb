//! Shared Kernel
//!
//! Vocabulary shared by every crate in the workspace:
//! - the unified [`error::app_error::AppError`] and its result alias
//! - the [`error::kind::ErrorKind`] classification mapped onto HTTP statuses
//! - conversions from library errors and the HTTP rendering of errors
//!
//! Only types whose meaning is identical across the auth core and the API
//! binary belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
