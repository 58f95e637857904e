//! Error types for the room layer.

use parlor_protocol::RoomId;

/// Errors that can occur during room operations.
///
/// All of these are expected outcomes of concurrent use (two callers
/// racing to join the same username, a stale room id), not crash
/// conditions. The facade surfaces them to the caller with a
/// descriptive message and performs no retry.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The identifier does not name this room.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The username is already a participant.
    #[error("user {0} is already joined")]
    AlreadyJoined(String),

    /// The username is not currently a participant.
    #[error("user {0} is not joined")]
    NotJoined(String),
}
