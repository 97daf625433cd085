//! Shared identity types for the Parlor lobby service.
//!
//! Both the coordination core and the HTTP gateway speak in terms of these
//! two ids, so they live in their own small crate at the bottom of the
//! dependency graph.

mod types;

pub use types::{RoomId, UserId};
