//! Room state for Parlor.
//!
//! The service's core: a single in-memory [`ChatRoom`] tracking the
//! joined participants and the append-only message log, with the
//! four operations that mutate or read it under concurrent access.
//!
//! # Key types
//!
//! - [`ChatRoom`] — the room state machine (join/send/leave/list)
//! - [`RoomError`] — membership and identifier conflicts
//!
//! Per-username state machine:
//!
//! ```text
//! Absent ──(Join)──→ Joined ──(Leave)──→ Absent
//! ```
//!
//! Send is only valid while Joined; re-joining after a leave is
//! permitted and returns the same room identifier.

mod error;
mod room;

pub use error::RoomError;
pub use room::ChatRoom;
