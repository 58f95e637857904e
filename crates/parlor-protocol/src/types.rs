//! Core protocol types for Parlor's wire format.
//!
//! This module defines every type that travels on the wire between a
//! chat client and the server. The boundary is RPC-shaped: a client
//! sends a [`Call`] frame carrying one [`Request`], and the server
//! answers with one or more [`Reply`] frames carrying [`Response`]s
//! that echo the call's sequence number.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The opaque identifier of the chat room.
///
/// Generated once when the room is created and immutable for the
/// process lifetime. Clients receive it from a successful Join and
/// must echo it back on every subsequent call.
///
/// `#[serde(transparent)]` makes this serialize as the inner string,
/// not as `{ "0": "..." }`, so clients see a plain id value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Wraps a raw id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the id is the empty string.
    ///
    /// An empty room id never names a real room; the facade rejects
    /// it before the room is consulted.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Message: one chat log entry
// ---------------------------------------------------------------------------

/// One entry of the room's message log: who said what.
///
/// This is both the stored shape and the wire shape. The log is
/// append-only, so a `Message` never changes once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The participant who sent the message.
    pub username: String,
    /// The message text.
    pub text: String,
}

// ---------------------------------------------------------------------------
// Request: what clients can ask for
// ---------------------------------------------------------------------------

/// A client request, one of the four room operations.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON:
///   `{ "type": "Join", "username": "alice" }`
/// which keeps the frames easy to read and to construct from any
/// client language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Enter the room under a username. Succeeds at most once per
    /// username until a matching Leave.
    Join { username: String },

    /// Append a message to the room's log. The caller must currently
    /// be a participant and must name the right room.
    Send {
        room_id: RoomId,
        username: String,
        text: String,
    },

    /// Exit the room. The caller must currently be a participant.
    Leave { room_id: RoomId, username: String },

    /// Retrieve the full message history. The server streams one
    /// [`Response::Message`] per entry, then [`Response::End`].
    GetMessages { room_id: RoomId },
}

// ---------------------------------------------------------------------------
// Response: what the server sends back
// ---------------------------------------------------------------------------

/// A server response to a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    /// Join succeeded; here is the room's identifier.
    Joined { room_id: RoomId },

    /// Empty acknowledgment: Send or Leave succeeded.
    Ack,

    /// One GetMessages stream item, in append order.
    Message { username: String, text: String },

    /// The GetMessages stream is complete.
    End,

    /// The call failed. `code` is one of the [`code`] constants and
    /// `message` is a human-readable description.
    Error { code: u16, message: String },
}

/// Error codes used in [`Response::Error`].
///
/// There are exactly two externally visible failure categories:
/// caller input that fails a required-non-empty check, and a room
/// state conflict (wrong room id, duplicate join, not joined).
pub mod code {
    /// A caller-supplied field failed validation. The caller must
    /// correct the input; retrying unchanged will fail again.
    pub const INVALID_ARGUMENT: u16 = 400;

    /// A room state conflict. An expected outcome of concurrent use,
    /// not a server fault.
    pub const INTERNAL: u16 = 500;
}

// ---------------------------------------------------------------------------
// Frames: the top-level wire format
// ---------------------------------------------------------------------------

/// A client-to-server frame: one request with a correlation number.
///
/// `seq` is chosen by the client (typically auto-incrementing). Every
/// reply to this call echoes the same `seq`, which lets a client
/// pipeline calls over one connection and match answers to questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    /// Client-chosen correlation number.
    pub seq: u64,
    /// The requested operation.
    pub request: Request,
}

/// A server-to-client frame: one response correlated to a call.
///
/// Unary calls produce exactly one `Reply`. A GetMessages call
/// produces a sequence of `Reply` frames sharing the call's `seq`:
/// zero or more `Message` items followed by `End`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    /// Echo of the originating call's `seq`.
    pub seq: u64,
    /// The response payload.
    pub response: Response,
}

// =========================================================================
// Tests
// =========================================================================
