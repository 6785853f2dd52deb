//! Login Identifier
//!
//! What a client types into the "user" field of the sign-in form.

/// Either a user name or an email address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginIdentifier {
    UserName(String),
    Email(String),
}

impl LoginIdentifier {
    /// Anything containing `@` is treated as an email; blank input is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if raw.contains('@') {
            Some(Self::Email(raw.to_lowercase()))
        } else {
            Some(Self::UserName(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::UserName(name) => name,
            Self::Email(email) => email,
        }
    }
}
