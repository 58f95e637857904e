//! Error types for the protocol layer.
//!
//! Each crate in Parlor defines its own error enum, so a
//! `ProtocolError` always means the problem is in frame
//! serialization, not in networking or room state.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a frame into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a frame).
    ///
    /// Common causes: malformed JSON, missing required fields, or a
    /// request type the server doesn't know.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame parsed but is invalid at the protocol level.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
}
