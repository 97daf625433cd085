//! Directory actor: single owner of the room registry and the membership
//! index.
//!
//! The directory is one serialized Tokio task. It allocates room ids,
//! spawns and shuts down room actors, answers directory-only requests
//! itself, and forwards join/leave requests to the right room together with
//! the original caller's handle. Rooms report committed membership changes
//! back through the [`CommitSink`], and the directory folds those commits
//! into its user → room index as they arrive.
//!
//! The index is therefore eventually consistent with the rooms: a caller can
//! observe `JoinedOk` before the directory has processed the matching
//! commit. In particular the fast "already in a room" check is not atomic
//! with the commit, so two concurrent joins by the same user to two
//! different rooms can both succeed. That behavior is deliberate and covered
//! by tests — see the crate docs.

use std::collections::HashMap;

use parlor_protocol::{RoomId, UserId};
use tokio::sync::mpsc;

use crate::room::{spawn_room, InfoReply, MemberReply, RoomHandle, RoomInfo};
use crate::{CallerHandle, LobbyError};

/// Reply type for room creation. Success carries the new room's id.
pub type CreateReply = Result<RoomId, LobbyError>;

/// Reply type for room deletion.
pub type DeleteReply = Result<(), LobbyError>;

/// Commands sent to the directory actor through its mailbox.
pub(crate) enum DirectoryCommand {
    /// Create a room owned by `owner`.
    Create {
        owner: UserId,
        caller: CallerHandle<CreateReply>,
    },

    /// Destroy a room and purge its index entries.
    Delete {
        room_id: RoomId,
        caller: CallerHandle<DeleteReply>,
    },

    /// Route a join request to a room. The room answers the caller.
    Join {
        room_id: RoomId,
        user: UserId,
        caller: CallerHandle<MemberReply>,
    },

    /// Route a leave request to a room. The room answers the caller.
    Leave {
        room_id: RoomId,
        user: UserId,
        caller: CallerHandle<MemberReply>,
    },

    /// Route a membership-snapshot request to a room.
    Info {
        room_id: RoomId,
        caller: CallerHandle<InfoReply>,
    },

    /// List the ids of all registered rooms.
    List {
        caller: CallerHandle<Vec<RoomId>>,
    },

    /// Look up which room the index currently places a user in.
    MemberRoom {
        user: UserId,
        caller: CallerHandle<Option<RoomId>>,
    },

    /// A room committed a join (internal, from a room actor).
    JoinCommitted { user: UserId, room_id: RoomId },

    /// A room committed a leave (internal, from a room actor).
    LeaveCommitted { user: UserId, room_id: RoomId },
}

/// Fire-and-forget channel a room uses to report committed membership
/// changes back to the directory.
///
/// Sends are synchronous on an unbounded channel, so a busy directory can
/// never stall a room's loop. The sender is weak: the actor hands sinks to
/// rooms without keeping its own mailbox open, so the loop still winds down
/// once the last [`Directory`] handle drops. A commit after that is dropped
/// silently — there is nothing left to keep consistent.
#[derive(Clone)]
pub(crate) struct CommitSink {
    sender: mpsc::WeakUnboundedSender<DirectoryCommand>,
}

impl CommitSink {
    pub(crate) fn joined(&self, user: UserId, room_id: RoomId) {
        if let Some(sender) = self.sender.upgrade() {
            let _ = sender.send(DirectoryCommand::JoinCommitted { user, room_id });
        }
    }

    pub(crate) fn left(&self, user: UserId, room_id: RoomId) {
        if let Some(sender) = self.sender.upgrade() {
            let _ = sender.send(DirectoryCommand::LeaveCommitted { user, room_id });
        }
    }
}

/// Handle to the running directory actor.
///
/// Cheap to clone — the gateway keeps one per process and shares it across
/// request handlers. Every method enqueues a command and awaits the reply on
/// a fresh caller handle; the bounded gateway timeout wraps these calls from
/// the outside.
#[derive(Clone)]
pub struct Directory {
    sender: mpsc::UnboundedSender<DirectoryCommand>,
}

impl Directory {
    /// Spawns the directory actor task and returns a handle to it.
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let actor = DirectoryActor {
            next_id: 1,
            rooms: HashMap::new(),
            membership: HashMap::new(),
            commits: CommitSink {
                sender: tx.downgrade(),
            },
            receiver: rx,
        };

        tokio::spawn(actor.run());

        Self { sender: tx }
    }

    /// Creates a room owned by `owner` and returns its id.
    ///
    /// Rejected with `AlreadyInRoom` if the index already places the owner
    /// in a room.
    pub async fn create_room(&self, owner: UserId) -> Result<RoomId, LobbyError> {
        let (caller, rx) = CallerHandle::channel();
        self.send(DirectoryCommand::Create { owner, caller })?;
        rx.await.map_err(|_| LobbyError::Unavailable)?
    }

    /// Destroys a room, purging every index entry that points at it.
    pub async fn delete_room(&self, room_id: RoomId) -> Result<(), LobbyError> {
        let (caller, rx) = CallerHandle::channel();
        self.send(DirectoryCommand::Delete { room_id, caller })?;
        rx.await.map_err(|_| LobbyError::Unavailable)?
    }

    /// Adds `user` to the room, enforcing "one room per user" via the
    /// index's fast check. The room itself delivers the final outcome.
    pub async fn join_room(&self, room_id: RoomId, user: UserId) -> Result<(), LobbyError> {
        let (caller, rx) = CallerHandle::channel();
        self.send(DirectoryCommand::Join {
            room_id,
            user,
            caller,
        })?;
        rx.await.map_err(|_| LobbyError::Unavailable)?
    }

    /// Removes `user` from the room. The room delivers the final outcome.
    pub async fn leave_room(&self, room_id: RoomId, user: UserId) -> Result<(), LobbyError> {
        let (caller, rx) = CallerHandle::channel();
        self.send(DirectoryCommand::Leave {
            room_id,
            user,
            caller,
        })?;
        rx.await.map_err(|_| LobbyError::Unavailable)?
    }

    /// Returns a membership snapshot of the room.
    pub async fn room_info(&self, room_id: RoomId) -> Result<RoomInfo, LobbyError> {
        let (caller, rx) = CallerHandle::channel();
        self.send(DirectoryCommand::Info { room_id, caller })?;
        rx.await.map_err(|_| LobbyError::Unavailable)?
    }

    /// Returns the ids of all registered rooms.
    pub async fn list_rooms(&self) -> Result<Vec<RoomId>, LobbyError> {
        let (caller, rx) = CallerHandle::channel();
        self.send(DirectoryCommand::List { caller })?;
        rx.await.map_err(|_| LobbyError::Unavailable)
    }

    /// Returns the room the index currently places `user` in, if any.
    ///
    /// A freshly observed `JoinedOk` is already reflected here: the room
    /// queues its commit before replying to the caller.
    pub async fn member_room(&self, user: UserId) -> Result<Option<RoomId>, LobbyError> {
        let (caller, rx) = CallerHandle::channel();
        self.send(DirectoryCommand::MemberRoom { user, caller })?;
        rx.await.map_err(|_| LobbyError::Unavailable)
    }

    fn send(&self, cmd: DirectoryCommand) -> Result<(), LobbyError> {
        self.sender.send(cmd).map_err(|_| LobbyError::Unavailable)
    }
}

/// The internal directory actor state. Runs inside a Tokio task.
struct DirectoryActor {
    /// Next room id to allocate. Strictly increasing, never revisited,
    /// even across deletions.
    next_id: u64,
    /// Registered rooms, keyed by id.
    rooms: HashMap<RoomId, RoomHandle>,
    /// Maps each user to the room they currently occupy.
    /// A user can be in at most one room at a time (key invariant).
    membership: HashMap<UserId, RoomId>,
    /// Sink handed to rooms so they can report commits back here.
    commits: CommitSink,
    receiver: mpsc::UnboundedReceiver<DirectoryCommand>,
}

impl DirectoryActor {
    async fn run(mut self) {
        tracing::info!("room directory started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                DirectoryCommand::Create { owner, caller } => self.handle_create(owner, caller),
                DirectoryCommand::Delete { room_id, caller } => {
                    self.handle_delete(room_id, caller)
                }
                DirectoryCommand::Join {
                    room_id,
                    user,
                    caller,
                } => self.handle_join(room_id, user, caller),
                DirectoryCommand::Leave {
                    room_id,
                    user,
                    caller,
                } => self.handle_leave(room_id, user, caller),
                DirectoryCommand::Info { room_id, caller } => match self.rooms.get(&room_id) {
                    Some(room) => room.info(caller),
                    None => caller.deliver(Err(LobbyError::UnknownRoom(room_id))),
                },
                DirectoryCommand::List { caller } => {
                    caller.deliver(self.rooms.keys().cloned().collect());
                }
                DirectoryCommand::MemberRoom { user, caller } => {
                    caller.deliver(self.membership.get(&user).cloned());
                }
                DirectoryCommand::JoinCommitted { user, room_id } => {
                    self.handle_join_committed(user, room_id);
                }
                DirectoryCommand::LeaveCommitted { user, room_id } => {
                    self.handle_leave_committed(user, room_id);
                }
            }
        }

        tracing::info!("room directory stopped");
    }

    fn handle_create(&mut self, owner: UserId, caller: CallerHandle<CreateReply>) {
        if let Some(existing) = self.membership.get(&owner) {
            tracing::info!(%owner, room_id = %existing, "create rejected, owner already in a room");
            caller.deliver(Err(LobbyError::AlreadyInRoom(owner, existing.clone())));
            return;
        }

        let room_id = RoomId::from_counter(self.next_id);
        self.next_id += 1;

        let handle = spawn_room(room_id.clone(), owner.clone());
        self.rooms.insert(room_id.clone(), handle);
        self.membership.insert(owner.clone(), room_id.clone());

        tracing::info!(%room_id, %owner, "room created");
        caller.deliver(Ok(room_id));
    }

    fn handle_delete(&mut self, room_id: RoomId, caller: CallerHandle<DeleteReply>) {
        let Some(room) = self.rooms.remove(&room_id) else {
            tracing::info!(%room_id, "delete rejected, unknown room");
            caller.deliver(Err(LobbyError::UnknownRoom(room_id)));
            return;
        };

        room.shutdown();
        self.membership.retain(|_, r| *r != room_id);

        tracing::info!(%room_id, "room deleted");
        caller.deliver(Ok(()));
    }

    fn handle_join(&mut self, room_id: RoomId, user: UserId, caller: CallerHandle<MemberReply>) {
        // Fast check against the index; does not consult the target room.
        // When the index already places the user in this very room, the
        // request is forwarded anyway — the room owns the authoritative
        // member set and answers AlreadyMember itself.
        if let Some(existing) = self.membership.get(&user) {
            if *existing != room_id {
                tracing::info!(%user, room_id = %existing, "join rejected, user already in a room");
                caller.deliver(Err(LobbyError::AlreadyInRoom(user, existing.clone())));
                return;
            }
        }

        let Some(room) = self.rooms.get(&room_id) else {
            tracing::info!(%room_id, %user, "join rejected, unknown room");
            caller.deliver(Err(LobbyError::UnknownRoom(room_id)));
            return;
        };

        // Forward-and-continue: the room answers the caller, and the index
        // is updated when the JoinCommitted notification arrives.
        room.join(user, caller, self.commits.clone());
    }

    fn handle_leave(&mut self, room_id: RoomId, user: UserId, caller: CallerHandle<MemberReply>) {
        let Some(room) = self.rooms.get(&room_id) else {
            tracing::info!(%room_id, %user, "leave rejected, unknown room");
            caller.deliver(Err(LobbyError::UnknownRoom(room_id)));
            return;
        };

        room.leave(user, caller, self.commits.clone());
    }

    fn handle_join_committed(&mut self, user: UserId, room_id: RoomId) {
        // A room drains commands queued ahead of its shutdown, so a commit
        // can arrive after the room was deleted. Indexing it would leave the
        // entry pointing at a dead room.
        if !self.rooms.contains_key(&room_id) {
            tracing::debug!(%user, %room_id, "join commit for deleted room, ignoring");
            return;
        }
        self.membership.insert(user, room_id);
    }

    fn handle_leave_committed(&mut self, user: UserId, room_id: RoomId) {
        // Only clear an entry that still points at the notifying room; a
        // concurrent delete-then-rejoin may have moved the user elsewhere.
        if self.membership.get(&user) == Some(&room_id) {
            self.membership.remove(&user);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// The actor must not hold a strong sender to its own mailbox, or the
    /// channel never closes and the loop never exits.
    #[tokio::test]
    async fn test_actor_exits_once_all_handles_drop() {
        let (tx, rx) = mpsc::unbounded_channel();
        let actor = DirectoryActor {
            next_id: 1,
            rooms: HashMap::new(),
            membership: HashMap::new(),
            commits: CommitSink {
                sender: tx.downgrade(),
            },
            receiver: rx,
        };
        let task = tokio::spawn(actor.run());

        drop(tx);
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("actor should stop once its last handle drops")
            .unwrap();
    }

    /// Commits sent through the weak sink still land while a handle exists.
    #[tokio::test]
    async fn test_weak_sink_delivers_while_directory_lives() {
        let dir = Directory::spawn();
        let room = dir.create_room(UserId::from("owner")).await.unwrap();
        dir.join_room(room.clone(), UserId::from("guest"))
            .await
            .unwrap();
        assert_eq!(
            dir.member_room(UserId::from("guest")).await.unwrap(),
            Some(room)
        );
    }
}
