//! Error types for the lobby core.

use parlor_protocol::{RoomId, UserId};

/// Rejections that lobby operations can resolve to.
///
/// These are ordinary outcomes, not faults: the directory and the rooms
/// never retry and never crash on a bad request — every validation failure
/// travels back to the caller as one of these values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LobbyError {
    /// No room is registered under this id.
    #[error("room {0} not found")]
    UnknownRoom(RoomId),

    /// The room is at capacity — no more member slots available.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The user is already a member of this room.
    #[error("user {0} already joined room {1}")]
    AlreadyMember(UserId, RoomId),

    /// The user is not a member of this room.
    #[error("user {0} is not in room {1}")]
    NotAMember(UserId, RoomId),

    /// The membership index already places this user in a room.
    /// Carries the id of the room the user currently occupies.
    #[error("user {0} is already in room {1}")]
    AlreadyInRoom(UserId, RoomId),

    /// The directory's or a room's mailbox is gone (shutting down).
    /// Boundary-level outcome; the gateway maps it to a generic failure.
    #[error("lobby is unavailable")]
    Unavailable,
}
