use serde::{Deserialize, Serialize};
use std::fmt;

/// Club (tenant) an account belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClubId(String);

impl ClubId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Empty or blank input means "no club"
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        raw.map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClubId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
