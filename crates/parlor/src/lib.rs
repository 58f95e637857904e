//! # Parlor
//!
//! A single-room chat backend reachable over an RPC-style WebSocket
//! boundary. Clients join with a username, send text messages,
//! leave, and retrieve the room's message history.
//!
//! The core lives in [`parlor_room`]: one process-lifetime
//! [`ChatRoom`](parlor_room::ChatRoom) guarding the participant set
//! and the append-only message log. This crate is the plumbing
//! around it: the listener, the per-connection request facade
//! (validation and error mapping), configuration, and the
//! `parlor-server` binary.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use parlor::ParlorServer;
//!
//! # async fn run() -> Result<(), parlor::ParlorError> {
//! let server = ParlorServer::builder()
//!     .bind("0.0.0.0:44044")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::{Config, ConfigError, CONFIG_ENV};
pub use error::ParlorError;
pub use server::{ParlorServer, ParlorServerBuilder};
