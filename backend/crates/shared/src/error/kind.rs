//! Error Kind
//!
//! Closed classification of failures, each bound to one HTTP status.

use serde::Serialize;

/// Error classification shared by every crate.
///
/// The kind decides the HTTP status of a response; the message carried next
/// to it by [`AppError`](super::app_error::AppError) decides the body.
///
/// ## Examples
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// assert_eq!(ErrorKind::Forbidden.status_code(), 403);
/// assert_eq!(ErrorKind::Forbidden.as_str(), "Forbidden");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorKind {
    /// 400 - malformed or invalid input
    BadRequest,
    /// 401 - no usable credential
    Unauthorized,
    /// 403 - authenticated but not permitted
    Forbidden,
    /// 404 - no such resource
    NotFound,
    /// 409 - conflicts with existing state (duplicate user name, ...)
    Conflict,
    /// 422 - well-formed but semantically unusable
    UnprocessableEntity,
    /// 429 - rate limit exceeded
    TooManyRequests,
    /// 500 - bug or unexpected failure
    InternalServerError,
    /// 503 - a dependency (database) is unavailable
    ServiceUnavailable,
}

impl ErrorKind {
    /// HTTP status code for this kind.
    #[inline]
    pub const fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::UnprocessableEntity => 422,
            ErrorKind::TooManyRequests => 429,
            ErrorKind::InternalServerError => 500,
            ErrorKind::ServiceUnavailable => 503,
        }
    }

    /// Standard reason phrase, used as the problem title.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "Bad Request",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::UnprocessableEntity => "Unprocessable Entity",
            ErrorKind::TooManyRequests => "Too Many Requests",
            ErrorKind::InternalServerError => "Internal Server Error",
            ErrorKind::ServiceUnavailable => "Service Unavailable",
        }
    }

    /// 5xx kinds. Their messages are never shown to clients.
    #[inline]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    #[inline]
    pub const fn is_client_error(&self) -> bool {
        let code = self.status_code();
        code >= 400 && code < 500
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
