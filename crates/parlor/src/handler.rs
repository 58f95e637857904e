//! Per-connection request facade.
//!
//! Each accepted connection gets its own Tokio task running this
//! handler. The loop is: receive frame → decode [`Call`] → validate
//! field shape → forward to the room → reply. Validation failures
//! never reach the room; room failures come back as
//! internal-category error replies.

use std::sync::Arc;
use std::time::Duration;

use parlor_protocol::{code, Call, Codec, Reply, Request, Response};
use parlor_transport::{Connection, WebSocketConnection};

use crate::server::ServerState;
use crate::ParlorError;

/// Handles a single connection from accept to close.
///
/// Exits when the client closes, a transport error occurs, or the
/// server's shutdown token fires between calls. An in-flight call is
/// always answered before the loop re-checks the token.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), ParlorError> {
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    loop {
        let data = tokio::select! {
            _ = state.shutdown.cancelled() => {
                tracing::debug!(%conn_id, "closing for shutdown");
                break;
            }
            received = conn.recv() => match received {
                Ok(Some(data)) => data,
                Ok(None) => {
                    tracing::debug!(%conn_id, "connection closed cleanly");
                    break;
                }
                Err(e) => {
                    tracing::debug!(%conn_id, error = %e, "recv error");
                    break;
                }
            }
        };

        let Call { seq, request } = match state.codec.decode(&data) {
            Ok(call) => call,
            Err(e) => {
                tracing::debug!(
                    %conn_id, error = %e, "failed to decode call frame"
                );
                // No seq to echo for an undecodable frame; use 0.
                send_error(
                    &conn,
                    &state.codec,
                    0,
                    code::INVALID_ARGUMENT,
                    "malformed call frame",
                )
                .await?;
                continue;
            }
        };

        run_call(
            &conn,
            &state.codec,
            state.call_timeout,
            seq,
            handle_call(&conn, &state, seq, request),
        )
        .await?;
    }

    Ok(())
}

/// Runs one dispatched call under the per-call deadline.
///
/// If the dispatch future does not finish in time, the client gets an
/// internal-category error reply echoing the call's seq and the
/// connection stays usable for further calls.
async fn run_call<C: Codec>(
    conn: &WebSocketConnection,
    codec: &C,
    call_timeout: Duration,
    seq: u64,
    dispatch: impl Future<Output = Result<(), ParlorError>>,
) -> Result<(), ParlorError> {
    match tokio::time::timeout(call_timeout, dispatch).await {
        Ok(result) => result,
        Err(_) => {
            send_error(conn, codec, seq, code::INTERNAL, "call timed out")
                .await
        }
    }
}

/// Dispatches one call: validate, forward to the room, reply.
///
/// All room calls receive the server's shutdown token as their
/// cancellation signal.
async fn handle_call<C: Codec>(
    conn: &WebSocketConnection,
    state: &Arc<ServerState<C>>,
    seq: u64,
    request: Request,
) -> Result<(), ParlorError> {
    match request {
        Request::Join { username } => {
            if username.is_empty() {
                return send_error(
                    conn,
                    &state.codec,
                    seq,
                    code::INVALID_ARGUMENT,
                    "username is required",
                )
                .await;
            }

            match state.room.join(&username, &state.shutdown).await {
                Ok(room_id) => {
                    send_reply(
                        conn,
                        &state.codec,
                        seq,
                        Response::Joined { room_id },
                    )
                    .await
                }
                Err(e) => {
                    send_error(
                        conn,
                        &state.codec,
                        seq,
                        code::INTERNAL,
                        &format!("error joining room: {e}"),
                    )
                    .await
                }
            }
        }

        Request::Send {
            room_id,
            username,
            text,
        } => {
            if room_id.is_empty() {
                return send_error(
                    conn,
                    &state.codec,
                    seq,
                    code::INVALID_ARGUMENT,
                    "room id is required",
                )
                .await;
            }
            if username.is_empty() {
                return send_error(
                    conn,
                    &state.codec,
                    seq,
                    code::INVALID_ARGUMENT,
                    "username is required",
                )
                .await;
            }
            if text.is_empty() {
                return send_error(
                    conn,
                    &state.codec,
                    seq,
                    code::INVALID_ARGUMENT,
                    "text is required",
                )
                .await;
            }

            match state
                .room
                .send(&username, &text, &room_id, &state.shutdown)
                .await
            {
                Ok(()) => {
                    send_reply(conn, &state.codec, seq, Response::Ack)
                        .await
                }
                Err(e) => {
                    send_error(
                        conn,
                        &state.codec,
                        seq,
                        code::INTERNAL,
                        &format!("error sending message: {e}"),
                    )
                    .await
                }
            }
        }

        Request::Leave { room_id, username } => {
            if room_id.is_empty() {
                return send_error(
                    conn,
                    &state.codec,
                    seq,
                    code::INVALID_ARGUMENT,
                    "room id is required",
                )
                .await;
            }
            if username.is_empty() {
                return send_error(
                    conn,
                    &state.codec,
                    seq,
                    code::INVALID_ARGUMENT,
                    "username is required",
                )
                .await;
            }

            match state
                .room
                .leave(&username, &room_id, &state.shutdown)
                .await
            {
                Ok(()) => {
                    send_reply(conn, &state.codec, seq, Response::Ack)
                        .await
                }
                Err(e) => {
                    send_error(
                        conn,
                        &state.codec,
                        seq,
                        code::INTERNAL,
                        &format!("error leaving room: {e}"),
                    )
                    .await
                }
            }
        }

        Request::GetMessages { room_id } => {
            if room_id.is_empty() {
                return send_error(
                    conn,
                    &state.codec,
                    seq,
                    code::INVALID_ARGUMENT,
                    "room id is required",
                )
                .await;
            }

            let messages = match state.room.list_messages(&room_id).await
            {
                Ok(messages) => messages,
                Err(e) => {
                    return send_error(
                        conn,
                        &state.codec,
                        seq,
                        code::INTERNAL,
                        &format!("error retrieving messages: {e}"),
                    )
                    .await;
                }
            };

            // Stream one reply per entry, then close the stream.
            // A send failure aborts the stream and ends the handler.
            for message in messages {
                send_reply(
                    conn,
                    &state.codec,
                    seq,
                    Response::Message {
                        username: message.username,
                        text: message.text,
                    },
                )
                .await?;
            }
            send_reply(conn, &state.codec, seq, Response::End).await
        }
    }
}

/// Encodes and sends one reply frame.
async fn send_reply(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    seq: u64,
    response: Response,
) -> Result<(), ParlorError> {
    let reply = Reply { seq, response };
    let bytes = codec.encode(&reply)?;
    conn.send(&bytes).await.map_err(ParlorError::Transport)?;
    Ok(())
}

/// Sends a [`Response::Error`] reply.
async fn send_error(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    seq: u64,
    code: u16,
    message: &str,
) -> Result<(), ParlorError> {
    send_reply(
        conn,
        codec,
        seq,
        Response::Error {
            code,
            message: message.to_string(),
        },
    )
    .await
}
