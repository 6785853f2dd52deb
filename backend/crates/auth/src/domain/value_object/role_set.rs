//! Role Set Value Object
//!
//! The roles a route accepts, fixed when the route is registered.

use std::fmt;

use thiserror::Error;

use super::user_role::UserRole;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoleSetError {
    #[error("A route must allow at least one role")]
    Empty,
}

/// Unordered, immutable set of [`UserRole`]s stored as a bitmask.
///
/// ## Examples
/// ```rust
/// use auth::models::{RoleSet, UserRole};
///
/// const STAFF: RoleSet = RoleSet::from_slice(&[UserRole::Coach, UserRole::ClubAdmin]);
/// assert!(STAFF.contains(UserRole::Coach));
/// assert!(!STAFF.contains(UserRole::SuperAdmin));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoleSet(u8);

impl RoleSet {
    /// Build a set from a literal list.
    ///
    /// Panics on an empty slice; in a `const` item that panic is a compile
    /// error, so an empty route declaration never builds.
    pub const fn from_slice(roles: &[UserRole]) -> Self {
        assert!(!roles.is_empty(), "a route must allow at least one role");
        let mut bits = 0u8;
        let mut i = 0;
        while i < roles.len() {
            bits |= 1 << roles[i].id();
            i += 1;
        }
        Self(bits)
    }

    /// Build a set from roles known only at runtime
    pub fn new(roles: impl IntoIterator<Item = UserRole>) -> Result<Self, RoleSetError> {
        let bits = roles
            .into_iter()
            .fold(0u8, |bits, role| bits | (1 << role.id()));
        if bits == 0 {
            return Err(RoleSetError::Empty);
        }
        Ok(Self(bits))
    }

    /// Exact membership, no hierarchy
    #[inline]
    pub const fn contains(&self, role: UserRole) -> bool {
        self.0 & (1 << role.id()) != 0
    }

    pub fn iter(&self) -> impl Iterator<Item = UserRole> + '_ {
        UserRole::ALL.into_iter().filter(|role| self.contains(*role))
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Always false for a constructed set; kept for API symmetry with `len`
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<&str> = self.iter().map(|role| role.code()).collect();
        f.write_str(&codes.join(", "))
    }
}
