//! Codec trait and implementations for serializing frames.
//!
//! A codec converts between Rust types and raw bytes. The protocol
//! layer doesn't care how frames are serialized; it only needs
//! something that implements the [`Codec`] trait, so the format can
//! be swapped without touching the server or the facade.
//!
//! Currently we provide [`JsonCodec`]. JSON is human-readable, which
//! makes calls easy to inspect in logs and from any client language.
//! A compact binary codec can be added later behind its own feature.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode values to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because a single codec instance is shared
/// by every connection handler task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use parlor_protocol::{Call, Codec, JsonCodec, Request};
///
/// let codec = JsonCodec;
///
/// let call = Call {
///     seq: 1,
///     request: Request::Join { username: "alice".into() },
/// };
///
/// let bytes = codec.encode(&call).unwrap();
/// let decoded: Call = codec.decode(&bytes).unwrap();
/// assert_eq!(call, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
