//! # Parlor
//!
//! An ephemeral room/lobby coordination service: users create rooms of up
//! to three members, join and leave them, and a single directory keeps a
//! global "one room per user" index consistent with each room's
//! authoritative membership — all via serialized per-entity mailboxes and
//! an asynchronous request/reply protocol.
//!
//! This crate is the outer shell: the HTTP gateway, the server builder, and
//! the `parlord` binary. The coordination core lives in `parlor-lobby`; the
//! periodic resource sampler in `parlor-monitor`.

mod error;
mod gateway;
mod server;

pub use error::ParlorError;
pub use gateway::router;
pub use server::{ParlorServer, ParlorServerBuilder};

pub use parlor_lobby::{Directory, LobbyError};
pub use parlor_monitor::MonitorConfig;
pub use parlor_protocol::{RoomId, UserId};
