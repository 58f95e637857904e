//! Transport-layer errors.

/// Errors raised by the listener and its connections.
///
/// Every variant carries the underlying [`std::io::Error`] so callers
/// can log the OS-level cause. A cleanly closed connection is not an
/// error; [`Connection::recv`](crate::Connection::recv) reports it as
/// `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Writing a frame to the peer failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Reading the next frame from the peer failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding the listener or accepting a connection failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),
}
