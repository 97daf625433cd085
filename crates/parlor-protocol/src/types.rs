//! Identity newtypes.
//!
//! Both ids are opaque strings on the wire. Wrapping them keeps a `RoomId`
//! from being passed where a `UserId` is expected, even though both are
//! `String` underneath.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A unique identifier for a room.
///
/// Allocated by the directory from a monotonically increasing counter
/// starting at 1, rendered in decimal. Ids are never reused, even after the
/// room is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    /// Builds the id for the `n`-th allocated room.
    pub fn from_counter(n: u64) -> Self {
        Self(n.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A caller-supplied identifier for a user.
///
/// The core performs no validation beyond non-emptiness (enforced at the
/// gateway); the string is otherwise opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_id_from_counter_is_decimal() {
        assert_eq!(RoomId::from_counter(1), RoomId::from("1"));
        assert_eq!(RoomId::from_counter(42).as_str(), "42");
    }

    #[test]
    fn test_ids_display_raw() {
        assert_eq!(RoomId::from("7").to_string(), "7");
        assert_eq!(UserId::from("alice").to_string(), "alice");
    }

    #[test]
    fn test_ids_serialize_transparent() {
        let json = serde_json::to_string(&UserId::from("bob")).unwrap();
        assert_eq!(json, "\"bob\"");
        let id: RoomId = serde_json::from_str("\"3\"").unwrap();
        assert_eq!(id, RoomId::from("3"));
    }
}
