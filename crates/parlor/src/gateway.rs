//! HTTP gateway: query-string endpoints in front of the lobby core.
//!
//! Every handler issues one core operation and blocks up to the configured
//! timeout for the reply — the only synchronous wait in the system. A
//! timeout does not retract the operation; it is reported as a generic
//! failure with outcome unknown. Success maps to 200, every typed rejection
//! to 409, all with plain-text bodies.

use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use parlor_lobby::{Directory, LobbyError};
use parlor_protocol::{RoomId, UserId};
use serde::Deserialize;

use crate::ParlorError;

/// Shared state for the request handlers.
#[derive(Clone)]
struct Gateway {
    directory: Directory,
    request_timeout: Duration,
}

impl Gateway {
    /// Runs one core call under the bounded wait.
    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, LobbyError>>,
    ) -> Result<T, ParlorError> {
        match tokio::time::timeout(self.request_timeout, call).await {
            Ok(reply) => reply.map_err(ParlorError::from),
            Err(_) => Err(ParlorError::RequestTimedOut(self.request_timeout)),
        }
    }
}

/// Builds the gateway router over a running directory.
pub fn router(directory: Directory, request_timeout: Duration) -> Router {
    let gateway = Gateway {
        directory,
        request_timeout,
    };

    Router::new()
        .route("/", get(welcome))
        .route("/create/room", get(create_room))
        .route("/delete/room", get(delete_room))
        .route("/join/room", get(join_room))
        .route("/leave/room", get(leave_room))
        .route("/list/rooms", get(list_rooms))
        .route("/get/room", get(get_room))
        .route("/get/system", get(get_system))
        .with_state(gateway)
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct UserParams {
    #[serde(rename = "userId")]
    user_id: String,
}

#[derive(Deserialize)]
struct RoomParams {
    id: String,
}

#[derive(Deserialize)]
struct RoomUserParams {
    id: String,
    #[serde(rename = "userId")]
    user_id: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn welcome() -> &'static str {
    "Welcome to Parlor!"
}

async fn create_room(
    State(gw): State<Gateway>,
    Query(p): Query<UserParams>,
) -> (StatusCode, String) {
    let owner = match parse_user(p.user_id) {
        Ok(u) => u,
        Err(rejection) => return rejection,
    };

    match gw.bounded(gw.directory.create_room(owner.clone())).await {
        Ok(room_id) => (
            StatusCode::OK,
            format!("Created room {room_id} owned by {owner}."),
        ),
        Err(e) => failure(e),
    }
}

async fn delete_room(
    State(gw): State<Gateway>,
    Query(p): Query<RoomParams>,
) -> (StatusCode, String) {
    let room_id = RoomId(p.id);
    match gw.bounded(gw.directory.delete_room(room_id.clone())).await {
        Ok(()) => (StatusCode::OK, format!("Room {room_id} deleted.")),
        Err(e) => failure(e),
    }
}

async fn join_room(
    State(gw): State<Gateway>,
    Query(p): Query<RoomUserParams>,
) -> (StatusCode, String) {
    let user = match parse_user(p.user_id) {
        Ok(u) => u,
        Err(rejection) => return rejection,
    };
    let room_id = RoomId(p.id);

    match gw
        .bounded(gw.directory.join_room(room_id.clone(), user.clone()))
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            format!("User {user} joined room {room_id}."),
        ),
        Err(e) => failure(e),
    }
}

async fn leave_room(
    State(gw): State<Gateway>,
    Query(p): Query<RoomUserParams>,
) -> (StatusCode, String) {
    let user = match parse_user(p.user_id) {
        Ok(u) => u,
        Err(rejection) => return rejection,
    };
    let room_id = RoomId(p.id);

    match gw
        .bounded(gw.directory.leave_room(room_id.clone(), user.clone()))
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            format!("User {user} left room {room_id}."),
        ),
        Err(e) => failure(e),
    }
}

async fn list_rooms(State(gw): State<Gateway>) -> (StatusCode, String) {
    match gw.bounded(gw.directory.list_rooms()).await {
        Ok(mut rooms) => {
            rooms.sort();
            let body = rooms
                .iter()
                .map(RoomId::as_str)
                .collect::<Vec<_>>()
                .join("\n");
            (StatusCode::OK, body)
        }
        Err(e) => failure(e),
    }
}

async fn get_room(
    State(gw): State<Gateway>,
    Query(p): Query<RoomParams>,
) -> (StatusCode, String) {
    let room_id = RoomId(p.id);
    match gw.bounded(gw.directory.room_info(room_id)).await {
        Ok(info) => {
            let members = info
                .members
                .iter()
                .map(UserId::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            (
                StatusCode::OK,
                format!(
                    "Room {} (owner {}, {}/{}): {members}",
                    info.room_id,
                    info.owner,
                    info.members.len(),
                    info.capacity
                ),
            )
        }
        Err(e) => failure(e),
    }
}

/// Host resource snapshot; sampling touches the OS, so it runs off the
/// async threads.
async fn get_system() -> (StatusCode, String) {
    match tokio::task::spawn_blocking(parlor_monitor::take_sample).await {
        Ok(sample) => (
            StatusCode::OK,
            format!(
                "Memory {}/{} bytes used, {} free; {} cpus at {}%.",
                sample.used_memory,
                sample.total_memory,
                sample.free_memory,
                sample.cpus,
                sample.cpu_percent
            ),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "system sample failed");
            (StatusCode::CONFLICT, "Operation failed.".to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome mapping
// ---------------------------------------------------------------------------

/// The core accepts any non-empty user id; emptiness is rejected here at
/// the boundary.
fn parse_user(raw: String) -> Result<UserId, (StatusCode, String)> {
    if raw.is_empty() {
        return Err((
            StatusCode::CONFLICT,
            "userId must not be empty.".to_string(),
        ));
    }
    Ok(UserId(raw))
}

/// Maps every failure to 409, per the gateway contract. Timeouts and
/// unavailable mailboxes get a generic body; typed rejections render their
/// own message.
fn failure(err: ParlorError) -> (StatusCode, String) {
    match &err {
        ParlorError::Lobby(LobbyError::Unavailable) | ParlorError::RequestTimedOut(_) => {
            tracing::warn!(error = %err, "request failed at the boundary");
            (StatusCode::CONFLICT, "Operation failed.".to_string())
        }
        _ => (StatusCode::CONFLICT, format!("{err}.")),
    }
}
