//! End-to-end tests for the Parlor server over a real WebSocket.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parlor::ParlorServerBuilder;
use parlor_protocol::{code, Call, Reply, Request, Response, RoomId};
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a server on a random port and returns the address.
async fn start_server() -> String {
    let server = ParlorServerBuilder::new()
        .bind("127.0.0.1:0")
        .call_timeout(Duration::from_secs(2))
        .build()
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

fn encode_call(seq: u64, request: Request) -> Message {
    let call = Call { seq, request };
    let bytes = serde_json::to_vec(&call).expect("encode");
    Message::Binary(bytes.into())
}

async fn next_reply(ws: &mut ClientWs) -> Reply {
    let msg = ws.next().await.unwrap().expect("recv reply");
    serde_json::from_slice(&msg.into_data()).expect("decode reply")
}

/// Sends one call and returns the first reply.
async fn call(ws: &mut ClientWs, seq: u64, request: Request) -> Reply {
    ws.send(encode_call(seq, request)).await.expect("send call");
    next_reply(ws).await
}

/// Joins a username and returns the room id.
async fn join(ws: &mut ClientWs, username: &str) -> RoomId {
    let reply = call(
        ws,
        1,
        Request::Join {
            username: username.into(),
        },
    )
    .await;
    match reply.response {
        Response::Joined { room_id } => room_id,
        other => panic!("expected Joined, got {other:?}"),
    }
}

// =========================================================================
// Join
// =========================================================================

#[tokio::test]
async fn test_join_returns_room_id() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    let room_id = join(&mut ws, "alice").await;
    assert!(!room_id.is_empty());
}

#[tokio::test]
async fn test_join_empty_username_invalid_argument() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    let reply = call(
        &mut ws,
        1,
        Request::Join {
            username: String::new(),
        },
    )
    .await;
    match reply.response {
        Response::Error { code: c, message } => {
            assert_eq!(c, code::INVALID_ARGUMENT);
            assert!(message.contains("username"));
        }
        other => panic!("expected Error 400, got {other:?}"),
    }
}

#[tokio::test]
async fn test_join_twice_internal_error() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;
    join(&mut ws, "alice").await;

    let reply = call(
        &mut ws,
        2,
        Request::Join {
            username: "alice".into(),
        },
    )
    .await;
    match reply.response {
        Response::Error { code: c, message } => {
            assert_eq!(c, code::INTERNAL);
            assert!(message.contains("already"));
        }
        other => panic!("expected Error 500, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rejoin_after_leave_same_room_id() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    let first = join(&mut ws, "alice").await;
    let reply = call(
        &mut ws,
        2,
        Request::Leave {
            room_id: first.clone(),
            username: "alice".into(),
        },
    )
    .await;
    assert_eq!(reply.response, Response::Ack);

    let reply = call(
        &mut ws,
        3,
        Request::Join {
            username: "alice".into(),
        },
    )
    .await;
    match reply.response {
        Response::Joined { room_id } => assert_eq!(room_id, first),
        other => panic!("expected Joined, got {other:?}"),
    }
}

// =========================================================================
// Send
// =========================================================================

#[tokio::test]
async fn test_send_acknowledged() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;
    let room_id = join(&mut ws, "alice").await;

    let reply = call(
        &mut ws,
        2,
        Request::Send {
            room_id,
            username: "alice".into(),
            text: "hi".into(),
        },
    )
    .await;
    assert_eq!(reply.seq, 2);
    assert_eq!(reply.response, Response::Ack);
}

#[tokio::test]
async fn test_send_empty_text_invalid_argument() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;
    let room_id = join(&mut ws, "alice").await;

    let reply = call(
        &mut ws,
        2,
        Request::Send {
            room_id: room_id.clone(),
            username: "alice".into(),
            text: String::new(),
        },
    )
    .await;
    match reply.response {
        Response::Error { code: c, message } => {
            assert_eq!(c, code::INVALID_ARGUMENT);
            assert!(message.contains("text"));
        }
        other => panic!("expected Error 400, got {other:?}"),
    }

    // The rejected send left the log untouched.
    ws.send(encode_call(3, Request::GetMessages { room_id }))
        .await
        .expect("send");
    let reply = next_reply(&mut ws).await;
    assert_eq!(reply.response, Response::End);
}

#[tokio::test]
async fn test_send_empty_room_id_invalid_argument() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;
    join(&mut ws, "alice").await;

    let reply = call(
        &mut ws,
        2,
        Request::Send {
            room_id: RoomId::new(""),
            username: "alice".into(),
            text: "hi".into(),
        },
    )
    .await;
    assert!(matches!(
        reply.response,
        Response::Error { code: c, .. } if c == code::INVALID_ARGUMENT
    ));
}

#[tokio::test]
async fn test_send_wrong_room_id_internal_error() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;
    join(&mut ws, "alice").await;

    let reply = call(
        &mut ws,
        2,
        Request::Send {
            room_id: RoomId::new("wrong-room-id"),
            username: "alice".into(),
            text: "hi".into(),
        },
    )
    .await;
    match reply.response {
        Response::Error { code: c, message } => {
            assert_eq!(c, code::INTERNAL);
            assert!(message.contains("not found"));
        }
        other => panic!("expected Error 500, got {other:?}"),
    }
}

#[tokio::test]
async fn test_send_not_joined_internal_error() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;
    let room_id = join(&mut ws, "alice").await;

    // "bob" never joined but names the right room.
    let reply = call(
        &mut ws,
        2,
        Request::Send {
            room_id,
            username: "bob".into(),
            text: "hi".into(),
        },
    )
    .await;
    match reply.response {
        Response::Error { code: c, message } => {
            assert_eq!(c, code::INTERNAL);
            assert!(message.contains("not joined"));
        }
        other => panic!("expected Error 500, got {other:?}"),
    }
}

// =========================================================================
// Leave
// =========================================================================

#[tokio::test]
async fn test_leave_then_send_not_joined() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;
    let room_id = join(&mut ws, "alice").await;

    let reply = call(
        &mut ws,
        2,
        Request::Leave {
            room_id: room_id.clone(),
            username: "alice".into(),
        },
    )
    .await;
    assert_eq!(reply.response, Response::Ack);

    let reply = call(
        &mut ws,
        3,
        Request::Send {
            room_id,
            username: "alice".into(),
            text: "hi2".into(),
        },
    )
    .await;
    assert!(matches!(
        reply.response,
        Response::Error { code: c, .. } if c == code::INTERNAL
    ));
}

#[tokio::test]
async fn test_leave_twice_internal_error() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;
    let room_id = join(&mut ws, "alice").await;

    let leave = Request::Leave {
        room_id,
        username: "alice".into(),
    };
    let reply = call(&mut ws, 2, leave.clone()).await;
    assert_eq!(reply.response, Response::Ack);

    let reply = call(&mut ws, 3, leave).await;
    assert!(matches!(
        reply.response,
        Response::Error { code: c, .. } if c == code::INTERNAL
    ));
}

#[tokio::test]
async fn test_leave_empty_fields_invalid_argument() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    let reply = call(
        &mut ws,
        1,
        Request::Leave {
            room_id: RoomId::new(""),
            username: "alice".into(),
        },
    )
    .await;
    assert!(matches!(
        reply.response,
        Response::Error { code: c, .. } if c == code::INVALID_ARGUMENT
    ));

    let reply = call(
        &mut ws,
        2,
        Request::Leave {
            room_id: RoomId::new("some-room"),
            username: String::new(),
        },
    )
    .await;
    assert!(matches!(
        reply.response,
        Response::Error { code: c, .. } if c == code::INVALID_ARGUMENT
    ));
}

// =========================================================================
// GetMessages
// =========================================================================

#[tokio::test]
async fn test_get_messages_streams_in_order_then_end() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;
    let room_id = join(&mut ws, "alice").await;

    for (i, text) in ["one", "two", "three"].iter().enumerate() {
        let reply = call(
            &mut ws,
            2 + i as u64,
            Request::Send {
                room_id: room_id.clone(),
                username: "alice".into(),
                text: (*text).into(),
            },
        )
        .await;
        assert_eq!(reply.response, Response::Ack);
    }

    ws.send(encode_call(9, Request::GetMessages { room_id }))
        .await
        .expect("send");

    for expected in ["one", "two", "three"] {
        let reply = next_reply(&mut ws).await;
        assert_eq!(reply.seq, 9, "stream items echo the call seq");
        match reply.response {
            Response::Message { username, text } => {
                assert_eq!(username, "alice");
                assert_eq!(text, expected);
            }
            other => panic!("expected Message, got {other:?}"),
        }
    }

    let reply = next_reply(&mut ws).await;
    assert_eq!(reply.seq, 9);
    assert_eq!(reply.response, Response::End);
}

#[tokio::test]
async fn test_get_messages_unknown_room_internal_error() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    let reply = call(
        &mut ws,
        1,
        Request::GetMessages {
            room_id: RoomId::new("no-such-room"),
        },
    )
    .await;
    assert!(matches!(
        reply.response,
        Response::Error { code: c, .. } if c == code::INTERNAL
    ));
}

#[tokio::test]
async fn test_get_messages_empty_room_id_invalid_argument() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    let reply = call(
        &mut ws,
        1,
        Request::GetMessages {
            room_id: RoomId::new(""),
        },
    )
    .await;
    assert!(matches!(
        reply.response,
        Response::Error { code: c, .. } if c == code::INVALID_ARGUMENT
    ));
}

// =========================================================================
// Multiple connections
// =========================================================================

#[tokio::test]
async fn test_two_clients_share_the_room() {
    let addr = start_server().await;

    let mut ws1 = connect(&addr).await;
    let mut ws2 = connect(&addr).await;

    let room1 = join(&mut ws1, "alice").await;
    let room2 = join(&mut ws2, "bob").await;
    assert_eq!(room1, room2, "one room per process");

    let reply = call(
        &mut ws1,
        2,
        Request::Send {
            room_id: room1.clone(),
            username: "alice".into(),
            text: "hello bob".into(),
        },
    )
    .await;
    assert_eq!(reply.response, Response::Ack);

    // Bob reads the history over his own connection.
    ws2.send(encode_call(2, Request::GetMessages { room_id: room2 }))
        .await
        .expect("send");
    let reply = next_reply(&mut ws2).await;
    match reply.response {
        Response::Message { username, text } => {
            assert_eq!(username, "alice");
            assert_eq!(text, "hello bob");
        }
        other => panic!("expected Message, got {other:?}"),
    }
    let reply = next_reply(&mut ws2).await;
    assert_eq!(reply.response, Response::End);
}

// =========================================================================
// Frame handling and shutdown
// =========================================================================

#[tokio::test]
async fn test_malformed_frame_rejected_connection_survives() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    ws.send(Message::Binary(b"not json".to_vec().into()))
        .await
        .expect("send");

    let reply = next_reply(&mut ws).await;
    assert_eq!(reply.seq, 0);
    assert!(matches!(
        reply.response,
        Response::Error { code: c, .. } if c == code::INVALID_ARGUMENT
    ));

    // The connection still works afterwards.
    let room_id = join(&mut ws, "alice").await;
    assert!(!room_id.is_empty());
}

#[tokio::test]
async fn test_reply_echoes_call_seq() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    let reply = call(
        &mut ws,
        99,
        Request::Join {
            username: "alice".into(),
        },
    )
    .await;
    assert_eq!(reply.seq, 99);
}

#[tokio::test]
async fn test_shutdown_token_stops_server() {
    let server = ParlorServerBuilder::new()
        .bind("127.0.0.1:0")
        .build()
        .await
        .expect("server should build");

    let shutdown = server.shutdown_token();
    let handle = tokio::spawn(async move { server.run().await });

    shutdown.cancel();

    let result = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("server should stop after cancel")
        .expect("task should not panic");
    assert!(result.is_ok());
}
