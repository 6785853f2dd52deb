use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of roles a club-platform account can hold.
///
/// Roles are flat: no role implies another. A route that should accept
/// `SuperAdmin` as well as `Coach` has to list both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum UserRole {
    Coach = 0,
    Player = 1,
    ClubAdmin = 2,
    Referee = 3,
    Fan = 4,
    SuperAdmin = 5,
}

impl UserRole {
    pub const ALL: [UserRole; 6] = [
        UserRole::Coach,
        UserRole::Player,
        UserRole::ClubAdmin,
        UserRole::Referee,
        UserRole::Fan,
        UserRole::SuperAdmin,
    ];

    #[inline]
    pub const fn id(&self) -> u8 {
        *self as u8
    }

    /// Wire and storage code
    #[inline]
    pub const fn code(&self) -> &'static str {
        use UserRole::*;
        match self {
            Coach => "coach",
            Player => "player",
            ClubAdmin => "club_admin",
            Referee => "referee",
            Fan => "fan",
            SuperAdmin => "super_admin",
        }
    }

    /// Parse a role code.
    ///
    /// Case and underscores are ignored, so `club_admin`, `ClubAdmin` and
    /// `Superadmin` (spellings used by the web and mobile clients) all parse.
    pub fn from_code(code: &str) -> Option<Self> {
        let normalized: String = code
            .trim()
            .chars()
            .filter(|c| *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        use UserRole::*;
        match normalized.as_str() {
            "coach" => Some(Coach),
            "player" => Some(Player),
            "clubadmin" => Some(ClubAdmin),
            "referee" => Some(Referee),
            "fan" => Some(Fan),
            "superadmin" => Some(SuperAdmin),
            _ => None,
        }
    }

    /// Roles anyone may pick when registering themselves
    #[inline]
    pub const fn is_self_assignable(&self) -> bool {
        use UserRole::*;
        matches!(self, Coach | Player | Referee | Fan)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
