//! Room actor: an isolated Tokio task that owns one room's membership set.
//!
//! Each room runs in its own task, communicating with the outside world
//! through an mpsc channel — no shared mutable state, just message passing.
//! The room enforces the capacity limit and per-room uniqueness, answers the
//! original caller directly through the forwarded [`CallerHandle`], and
//! fire-and-forgets a commit notification to the directory after every
//! successful membership change.

use std::collections::HashSet;

use parlor_protocol::{RoomId, UserId};
use tokio::sync::mpsc;

use crate::directory::CommitSink;
use crate::{CallerHandle, LobbyError};

/// Fixed member capacity of every room (owner included).
pub const ROOM_CAPACITY: usize = 3;

/// Reply type for join/leave requests. Success carries no payload.
pub type MemberReply = Result<(), LobbyError>;

/// Reply type for room-info requests.
pub type InfoReply = Result<RoomInfo, LobbyError>;

/// A snapshot of a room's membership.
#[derive(Debug, Clone)]
pub struct RoomInfo {
    /// The room's unique id.
    pub room_id: RoomId,
    /// The user that created the room.
    pub owner: UserId,
    /// Current members, owner included.
    pub members: Vec<UserId>,
    /// Maximum members allowed.
    pub capacity: usize,
}

/// Commands sent to a room actor through its channel.
///
/// Join/leave carry the original caller's handle plus the commit sink the
/// room uses to tell the directory about a change that actually happened.
pub(crate) enum RoomCommand {
    /// Add a user to the room.
    Join {
        user: UserId,
        caller: CallerHandle<MemberReply>,
        commits: CommitSink,
    },

    /// Remove a user from the room.
    Leave {
        user: UserId,
        caller: CallerHandle<MemberReply>,
        commits: CommitSink,
    },

    /// Request a membership snapshot.
    Info { caller: CallerHandle<InfoReply> },

    /// Shut down the room. Commands already queued ahead of this one are
    /// still processed.
    Shutdown,
}

impl RoomCommand {
    /// Answers the embedded caller with `Unavailable` when the command could
    /// not be enqueued (room task already gone).
    fn reject_unavailable(self) {
        match self {
            Self::Join { caller, .. } | Self::Leave { caller, .. } => {
                caller.deliver(Err(LobbyError::Unavailable));
            }
            Self::Info { caller } => caller.deliver(Err(LobbyError::Unavailable)),
            Self::Shutdown => {}
        }
    }
}

/// Handle to a running room actor, held by the directory.
///
/// Cheap to clone — just an `mpsc::UnboundedSender` wrapper. All sends are
/// synchronous and non-blocking, so a slow room can never stall the
/// directory's own loop.
#[derive(Clone)]
pub(crate) struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::UnboundedSender<RoomCommand>,
}

impl RoomHandle {
    pub(crate) fn join(
        &self,
        user: UserId,
        caller: CallerHandle<MemberReply>,
        commits: CommitSink,
    ) {
        self.send(RoomCommand::Join {
            user,
            caller,
            commits,
        });
    }

    pub(crate) fn leave(
        &self,
        user: UserId,
        caller: CallerHandle<MemberReply>,
        commits: CommitSink,
    ) {
        self.send(RoomCommand::Leave {
            user,
            caller,
            commits,
        });
    }

    pub(crate) fn info(&self, caller: CallerHandle<InfoReply>) {
        self.send(RoomCommand::Info { caller });
    }

    pub(crate) fn shutdown(&self) {
        self.send(RoomCommand::Shutdown);
    }

    fn send(&self, cmd: RoomCommand) {
        if let Err(mpsc::error::SendError(cmd)) = self.sender.send(cmd) {
            tracing::debug!(room_id = %self.room_id, "room mailbox closed");
            cmd.reject_unavailable();
        }
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room_id: RoomId,
    owner: UserId,
    members: HashSet<UserId>,
    receiver: mpsc::UnboundedReceiver<RoomCommand>,
}

impl RoomActor {
    /// Runs the actor loop, processing one command at a time until shutdown.
    async fn run(mut self) {
        tracing::info!(room_id = %self.room_id, owner = %self.owner, "room started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    user,
                    caller,
                    commits,
                } => self.handle_join(user, caller, commits),
                RoomCommand::Leave {
                    user,
                    caller,
                    commits,
                } => self.handle_leave(user, caller, commits),
                RoomCommand::Info { caller } => caller.deliver(Ok(self.info())),
                RoomCommand::Shutdown => {
                    tracing::info!(room_id = %self.room_id, "room shutting down");
                    break;
                }
            }
        }

        tracing::info!(room_id = %self.room_id, "room stopped");
    }

    fn handle_join(
        &mut self,
        user: UserId,
        caller: CallerHandle<MemberReply>,
        commits: CommitSink,
    ) {
        if self.members.len() >= ROOM_CAPACITY {
            tracing::info!(room_id = %self.room_id, %user, "join rejected, room full");
            caller.deliver(Err(LobbyError::RoomFull(self.room_id.clone())));
            return;
        }
        if self.members.contains(&user) {
            tracing::info!(room_id = %self.room_id, %user, "join rejected, already a member");
            caller.deliver(Err(LobbyError::AlreadyMember(user, self.room_id.clone())));
            return;
        }

        self.members.insert(user.clone());
        tracing::info!(
            room_id = %self.room_id,
            %user,
            members = self.members.len(),
            "user joined"
        );

        // Commit first, reply second: a caller that observes the reply and
        // immediately queries the directory is then ordered after the commit
        // in the directory's mailbox. The reply itself is still not gated on
        // the directory processing anything.
        commits.joined(user, self.room_id.clone());
        caller.deliver(Ok(()));
    }

    fn handle_leave(
        &mut self,
        user: UserId,
        caller: CallerHandle<MemberReply>,
        commits: CommitSink,
    ) {
        if !self.members.remove(&user) {
            tracing::info!(room_id = %self.room_id, %user, "leave rejected, not a member");
            caller.deliver(Err(LobbyError::NotAMember(user, self.room_id.clone())));
            return;
        }

        tracing::info!(
            room_id = %self.room_id,
            %user,
            members = self.members.len(),
            "user left"
        );

        commits.left(user, self.room_id.clone());
        caller.deliver(Ok(()));
    }

    fn info(&self) -> RoomInfo {
        let mut members: Vec<UserId> = self.members.iter().cloned().collect();
        members.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        RoomInfo {
            room_id: self.room_id.clone(),
            owner: self.owner.clone(),
            members,
            capacity: ROOM_CAPACITY,
        }
    }
}

/// Spawns a new room actor task with the owner pre-added as the first
/// member, and returns a handle to communicate with it.
pub(crate) fn spawn_room(room_id: RoomId, owner: UserId) -> RoomHandle {
    let (tx, rx) = mpsc::unbounded_channel();

    let mut members = HashSet::new();
    members.insert(owner.clone());

    let actor = RoomActor {
        room_id: room_id.clone(),
        owner,
        members,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
