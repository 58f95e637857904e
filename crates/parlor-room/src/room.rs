//! The room state machine: participants and the message log.
//!
//! `ChatRoom` is the one piece of shared mutable state in the whole
//! service. Every inbound call ends up here, so the locking
//! discipline matters: reads may overlap, mutations are exclusive,
//! and each operation holds a single guard across its entire
//! check-then-act sequence. Checking membership under one guard and
//! mutating under another would open a race between, say, a Join and
//! a Leave for the same username.

use std::collections::HashSet;

use parlor_protocol::{Message, RoomId};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::RoomError;

/// The mutable interior of a room, guarded by one `RwLock`.
#[derive(Debug, Default)]
struct RoomInner {
    /// Usernames currently joined. Membership implies "may send".
    participants: HashSet<String>,
    /// Append-only message log in arrival order. Never reordered,
    /// never truncated.
    messages: Vec<Message>,
}

/// A single chat room: the set of joined participants and the
/// append-only message log.
///
/// One instance is created when the service starts and lives until
/// shutdown. There is no dynamic room creation or deletion. The
/// room's identifier is generated at construction and every
/// operation except [`join`](Self::join) must present it; calls
/// naming any other id are rejected without touching state.
///
/// ## Cancellation
///
/// Each mutating operation takes a [`CancellationToken`] and checks
/// it exactly once, immediately before the mutation. If the token is
/// already cancelled at that instant the mutation is skipped and the
/// call still reports success (Join still returns the room id).
/// There is no continuous polling and a cancelled call never fails
/// with a cancellation error. This reproduces the behavior of the
/// reference service; callers that need "cancelled means failed"
/// semantics must check the token themselves.
pub struct ChatRoom {
    room_id: RoomId,
    inner: RwLock<RoomInner>,
}

impl ChatRoom {
    /// Creates the room with a freshly generated identifier.
    pub fn new() -> Self {
        Self::with_id(RoomId::new(Uuid::new_v4().to_string()))
    }

    /// Creates the room with a caller-chosen identifier.
    ///
    /// Useful in tests that need a predictable id.
    pub fn with_id(room_id: RoomId) -> Self {
        tracing::info!(%room_id, "room created");
        Self {
            room_id,
            inner: RwLock::new(RoomInner::default()),
        }
    }

    /// Returns the room's identifier.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Adds `username` to the participants and returns the room id.
    ///
    /// Fails with [`RoomError::AlreadyJoined`] if the username is
    /// already present. A pre-cancelled token makes this a no-op
    /// that still returns the room id (see the type-level docs);
    /// the duplicate check runs before the cancellation checkpoint,
    /// so a cancelled duplicate join still fails.
    pub async fn join(
        &self,
        username: &str,
        cancel: &CancellationToken,
    ) -> Result<RoomId, RoomError> {
        let mut inner = self.inner.write().await;

        if inner.participants.contains(username) {
            return Err(RoomError::AlreadyJoined(username.to_string()));
        }

        if cancel.is_cancelled() {
            return Ok(self.room_id.clone());
        }

        inner.participants.insert(username.to_string());
        tracing::info!(
            room_id = %self.room_id,
            %username,
            participants = inner.participants.len(),
            "user joined"
        );

        Ok(self.room_id.clone())
    }

    /// Appends `(username, text)` to the message log.
    ///
    /// Fails with [`RoomError::NotFound`] if `room_id` does not name
    /// this room, and with [`RoomError::NotJoined`] if the username
    /// is not currently a participant. A pre-cancelled token skips
    /// the append and still reports success.
    pub async fn send(
        &self,
        username: &str,
        text: &str,
        room_id: &RoomId,
        cancel: &CancellationToken,
    ) -> Result<(), RoomError> {
        if *room_id != self.room_id {
            return Err(RoomError::NotFound(room_id.clone()));
        }

        let mut inner = self.inner.write().await;

        if !inner.participants.contains(username) {
            return Err(RoomError::NotJoined(username.to_string()));
        }

        if cancel.is_cancelled() {
            return Ok(());
        }

        inner.messages.push(Message {
            username: username.to_string(),
            text: text.to_string(),
        });
        tracing::debug!(
            room_id = %self.room_id,
            %username,
            messages = inner.messages.len(),
            "message appended"
        );

        Ok(())
    }

    /// Removes `username` from the participants.
    ///
    /// Fails with [`RoomError::NotFound`] on an id mismatch, and
    /// with [`RoomError::NotJoined`] if the username is not a
    /// participant. A pre-cancelled token skips the removal and
    /// still reports success. Re-joining after a leave is permitted.
    pub async fn leave(
        &self,
        username: &str,
        room_id: &RoomId,
        cancel: &CancellationToken,
    ) -> Result<(), RoomError> {
        if *room_id != self.room_id {
            return Err(RoomError::NotFound(room_id.clone()));
        }

        let mut inner = self.inner.write().await;

        if !inner.participants.contains(username) {
            return Err(RoomError::NotJoined(username.to_string()));
        }

        if cancel.is_cancelled() {
            return Ok(());
        }

        inner.participants.remove(username);
        tracing::info!(
            room_id = %self.room_id,
            %username,
            participants = inner.participants.len(),
            "user left"
        );

        Ok(())
    }

    /// Returns a snapshot copy of the message log in append order.
    ///
    /// Fails with [`RoomError::NotFound`] on an id mismatch. Purely
    /// read-only (holds only the read lock) and never subject to
    /// cancellation. Concurrent reads proceed together.
    pub async fn list_messages(
        &self,
        room_id: &RoomId,
    ) -> Result<Vec<Message>, RoomError> {
        if *room_id != self.room_id {
            return Err(RoomError::NotFound(room_id.clone()));
        }

        let inner = self.inner.read().await;
        Ok(inner.messages.clone())
    }

    /// Returns the number of participants currently joined.
    pub async fn participant_count(&self) -> usize {
        self.inner.read().await.participants.len()
    }
}

impl Default for ChatRoom {
    fn default() -> Self {
        Self::new()
    }
}
