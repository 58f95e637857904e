//! Wire protocol for Parlor.
//!
//! This crate defines the language that chat clients and the server
//! speak:
//!
//! - **Types** ([`Call`], [`Reply`], [`Request`], [`Response`],
//!   [`RoomId`], [`Message`]) — the frames that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those frames
//!   are converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and the
//! request facade (validation and room calls). It knows nothing
//! about connections or the room itself.
//!
//! ```text
//! Transport (bytes) → Protocol (Call/Reply) → Facade (room ops)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{code, Call, Message, Reply, Request, Response, RoomId};
