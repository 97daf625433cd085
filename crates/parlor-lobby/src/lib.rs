//! Room coordination core for Parlor.
//!
//! Two kinds of actors, each an isolated Tokio task draining its own
//! mailbox: one [`Directory`] owning the room registry and the global
//! user → room membership index, and one room actor per room owning that
//! room's membership set (capacity 3, fixed).
//!
//! Requests enter through the directory. Directory-only operations (create,
//! delete, list) are answered there; join/leave are forwarded to the room
//! together with the original caller's [`CallerHandle`], and the room
//! answers the caller directly while separately notifying the directory of
//! the committed change. The caller's answer is never gated on the
//! directory processing that commit — which also means the "one room per
//! user" fast check is not atomic with the commit, and two racing joins by
//! the same user can both succeed. That race is part of the documented
//! behavior, not a bug.
//!
//! # Key types
//!
//! - [`Directory`] — spawn the directory actor, issue lobby operations
//! - [`CallerHandle`] — deliver a request's final outcome to its origin
//! - [`RoomInfo`] — membership snapshot of one room
//! - [`LobbyError`] — the typed rejection taxonomy

mod caller;
mod directory;
mod error;
mod room;

pub use caller::CallerHandle;
pub use directory::{CreateReply, DeleteReply, Directory};
pub use error::LobbyError;
pub use room::{InfoReply, MemberReply, RoomInfo, ROOM_CAPACITY};
