//! Domain types shared by services and the HTTP layer.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::users::Role;

/// Unique identifier for a reported item.
///
/// ```rust
/// use lostfound::domain::ItemId;
///
/// let id = ItemId::new(42);
/// assert_eq!(id.value(), 42);
/// assert_eq!(id.to_string(), "42");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(i32);

impl ItemId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for ItemId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl From<ItemId> for i32 {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

/// The authenticated identity carried by a session.
///
/// This is a transient copy: changing the stored user does not update
/// sessions that already exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub role: Role,
}

impl Identity {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<crate::db::User> for Identity {
    fn from(user: crate::db::User) -> Self {
        Self {
            username: user.username,
            role: user.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_id_conversions() {
        let id = ItemId::new(7);
        assert_eq!(i32::from(id), 7);
        assert_eq!(ItemId::from(7), id);
    }

    #[test]
    fn identity_round_trips_through_session_encoding() {
        let identity = Identity {
            username: "alice".to_string(),
            role: Role::User,
        };
        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(json["role"], "user");
        let back: Identity = serde_json::from_value(json).unwrap();
        assert_eq!(back, identity);
        assert!(!back.is_admin());
    }
}
