//! `ParlorServer` builder and accept loop.
//!
//! This is the entry point for running the chat service. It ties the
//! layers together: transport → protocol → facade → room.

use std::sync::Arc;
use std::time::Duration;

use parlor_protocol::{Codec, JsonCodec};
use parlor_room::ChatRoom;
use parlor_transport::{Transport, WebSocketTransport};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::handler::handle_connection;
use crate::ParlorError;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The
/// room does its own interior locking; nothing else here mutates.
pub(crate) struct ServerState<C: Codec> {
    /// The one chat room this process serves.
    pub(crate) room: ChatRoom,
    pub(crate) codec: C,
    pub(crate) call_timeout: Duration,
    /// Cancelled on graceful shutdown. Doubles as the cancellation
    /// signal passed to every room call.
    pub(crate) shutdown: CancellationToken,
}

/// Builder for configuring and starting a Parlor server.
///
/// # Example
///
/// ```rust,no_run
/// use parlor::ParlorServer;
///
/// # async fn run() -> Result<(), parlor::ParlorError> {
/// let server = ParlorServer::builder()
///     .bind("0.0.0.0:44044")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct ParlorServerBuilder {
    bind_addr: String,
    call_timeout: Duration,
}

impl ParlorServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:44044".to_string(),
            call_timeout: Duration::from_secs(5),
        }
    }

    /// Sets the address to bind the listener to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the per-call timeout.
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Binds the listener, creates the room, and returns the server.
    ///
    /// Uses [`JsonCodec`]; the room identifier is generated here and
    /// lives until the process exits.
    pub async fn build(
        self,
    ) -> Result<ParlorServer<JsonCodec>, ParlorError> {
        let transport =
            WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            room: ChatRoom::new(),
            codec: JsonCodec,
            call_timeout: self.call_timeout,
            shutdown: CancellationToken::new(),
        });

        Ok(ParlorServer { transport, state })
    }
}

impl Default for ParlorServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Parlor chat server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct ParlorServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl ParlorServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> ParlorServerBuilder {
        ParlorServerBuilder::new()
    }
}

impl<C: Codec> ParlorServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Returns a token that stops the server when cancelled.
    ///
    /// Cancelling it makes the accept loop stop taking new
    /// connections; in-flight calls finish and their replies are
    /// sent before the handlers exit.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.state.shutdown.clone()
    }

    /// Runs the accept loop until the shutdown token fires.
    ///
    /// Each accepted connection gets its own handler task. After the
    /// token fires the loop drains all handler tasks before
    /// returning, so no in-flight call is dropped.
    pub async fn run(mut self) -> Result<(), ParlorError> {
        tracing::info!(
            room_id = %self.state.room.room_id(),
            "Parlor server running"
        );

        let shutdown = self.state.shutdown.clone();
        let mut handlers = JoinSet::new();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("shutdown requested, no longer accepting");
                    break;
                }
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        let state = Arc::clone(&self.state);
                        handlers.spawn(async move {
                            if let Err(e) =
                                handle_connection(conn, state).await
                            {
                                tracing::debug!(
                                    error = %e,
                                    "connection ended with error"
                                );
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                    }
                }
            }
        }

        tracing::info!(
            in_flight = handlers.len(),
            "draining connection handlers"
        );
        while handlers.join_next().await.is_some() {}

        tracing::info!("Parlor server stopped");
        Ok(())
    }
}
