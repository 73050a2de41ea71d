//! Per-connection handler: handshake and intent routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Split the connection; spawn a writer task that owns the sink
//!   2. Receive `Hello` → validate version → send `Welcome`
//!   3. Loop: receive envelopes → route intents to the room registry
//!   4. Leave every joined room, stop the writer, close the socket
//!
//! Room events reach the writer through an unbounded channel that each
//! joined room holds a clone of. Direct replies (errors, acks, room
//! lists) use a second channel so they never wait on a room.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use minehub_protocol::{
    ClientMessage, Codec, Coord, Envelope, PROTOCOL_VERSION, PlayerId, ProtocolError, RoomId,
};
use minehub_room::{RoomConfig, RoomError, RoomOutbound};
use minehub_transport::{
    Connection, FrameReceiver, FrameSender, WebSocketConnection, WebSocketReceiver,
    WebSocketSender,
};
use tokio::sync::mpsc;

use crate::server::{HANDSHAKE_TIMEOUT, IDLE_TIMEOUT, ServerState};
use crate::{MinehubError, ServerMessage};

/// How long the writer gets to flush after the read loop ends.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Tracks a connection's room memberships and keeps the live-connection
/// count honest.
///
/// The normal exit path calls [`leave_all`](Self::leave_all). If the
/// handler unwinds instead, `Drop` spawns the leaves.
struct ConnectionGuard {
    player_id: PlayerId,
    joined: HashSet<RoomId>,
    state: Arc<ServerState>,
}

impl ConnectionGuard {
    fn new(player_id: PlayerId, state: Arc<ServerState>) -> Self {
        state.connections.fetch_add(1, Ordering::Relaxed);
        Self {
            player_id,
            joined: HashSet::new(),
            state,
        }
    }

    async fn leave_all(&mut self) {
        for room_id in std::mem::take(&mut self.joined) {
            leave_quietly(&self.state, &room_id, self.player_id).await;
        }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.state.connections.fetch_sub(1, Ordering::Relaxed);

        if self.joined.is_empty() {
            return;
        }
        let player_id = self.player_id;
        let rooms = std::mem::take(&mut self.joined);
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            for room_id in rooms {
                leave_quietly(&state, &room_id, player_id).await;
            }
        });
    }
}

async fn leave_quietly(state: &ServerState, room_id: &RoomId, player_id: PlayerId) {
    if let Err(e) = state.rooms.leave(room_id, player_id).await {
        tracing::debug!(%room_id, %player_id, error = %e, "leave on disconnect failed");
    }
}

/// What the read loop does after an intent.
enum Flow {
    Continue,
    Close,
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), MinehubError> {
    let conn_id = conn.id();
    let player_id = PlayerId(conn_id.into_inner());
    tracing::debug!(%conn_id, peer = %conn.peer_addr(), "handling new connection");

    let (sink, mut stream) = conn.into_split();
    let (direct_tx, direct_rx) = mpsc::unbounded_channel();
    let (room_tx, room_rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_loop(sink, direct_rx, room_rx, Arc::clone(&state)));

    let mut guard = ConnectionGuard::new(player_id, Arc::clone(&state));

    let result = match perform_handshake(&mut stream, &state, player_id, &direct_tx).await {
        Ok(()) => {
            tracing::info!(%player_id, "player connected");
            read_loop(&mut stream, &state, &mut guard, &direct_tx, &room_tx).await;
            Ok(())
        }
        Err(e) => Err(e),
    };

    guard.leave_all().await;
    drop(guard);
    drop(room_tx);
    drop(direct_tx);

    if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, writer).await.is_err() {
        tracing::debug!(%player_id, "writer did not finish in time");
    }
    tracing::info!(%player_id, "player disconnected");
    result
}

/// Receives `Hello`, checks the version, sends `Welcome`.
///
/// Any other first frame is answered with a 400 and ends the connection.
async fn perform_handshake(
    stream: &mut WebSocketReceiver,
    state: &ServerState,
    player_id: PlayerId,
    direct_tx: &mpsc::UnboundedSender<ServerMessage>,
) -> Result<(), MinehubError> {
    let data = match tokio::time::timeout(HANDSHAKE_TIMEOUT, stream.recv()).await {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => {
            return Err(ProtocolError::InvalidMessage(
                "connection closed before handshake".into(),
            )
            .into());
        }
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => {
            return Err(ProtocolError::InvalidMessage("handshake timed out".into()).into());
        }
    };

    let reason = match state.codec.decode::<Envelope<ClientMessage>>(&data) {
        Ok(Envelope {
            body: ClientMessage::Hello { version },
            ..
        }) if version == PROTOCOL_VERSION => {
            let _ = direct_tx.send(ServerMessage::Welcome {
                player_id,
                server_time: chrono::Utc::now().timestamp_millis(),
            });
            return Ok(());
        }
        Ok(Envelope {
            body: ClientMessage::Hello { version },
            ..
        }) => format!("version mismatch: expected {PROTOCOL_VERSION}, got {version}"),
        Ok(_) => "first message must be Hello".to_string(),
        Err(e) => e.to_string(),
    };

    let _ = direct_tx.send(ServerMessage::Error {
        code: 400,
        message: reason.clone(),
    });
    Err(ProtocolError::InvalidMessage(reason).into())
}

async fn read_loop(
    stream: &mut WebSocketReceiver,
    state: &ServerState,
    guard: &mut ConnectionGuard,
    direct_tx: &mpsc::UnboundedSender<ServerMessage>,
    room_tx: &mpsc::UnboundedSender<RoomOutbound>,
) {
    let player_id = guard.player_id;

    loop {
        let data = match tokio::time::timeout(IDLE_TIMEOUT, stream.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                tracing::debug!(%player_id, "connection closed cleanly");
                break;
            }
            Ok(Err(e)) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                break;
            }
            Err(_) => {
                tracing::info!(%player_id, "connection idle too long");
                break;
            }
        };

        let envelope: Envelope<ClientMessage> = match state.codec.decode(&data) {
            Ok(env) => env,
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "failed to decode envelope");
                let _ = direct_tx.send(ServerMessage::Error {
                    code: 400,
                    message: e.to_string(),
                });
                continue;
            }
        };

        match dispatch(state, guard, direct_tx, room_tx, envelope.body).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Close) => break,
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "intent rejected");
                let _ = direct_tx.send(ServerMessage::from_room_error(&e));
            }
        }

        // The writer is gone, so nothing more can reach the client.
        if direct_tx.is_closed() {
            break;
        }
    }
}

/// Routes one intent. Room outcomes are broadcast by the room itself;
/// only failures and non-room replies go out here.
async fn dispatch(
    state: &ServerState,
    guard: &mut ConnectionGuard,
    direct_tx: &mpsc::UnboundedSender<ServerMessage>,
    room_tx: &mpsc::UnboundedSender<RoomOutbound>,
    msg: ClientMessage,
) -> Result<Flow, RoomError> {
    let player_id = guard.player_id;

    match msg {
        ClientMessage::Hello { .. } => {
            let _ = direct_tx.send(ServerMessage::Error {
                code: 400,
                message: "already greeted".into(),
            });
        }

        ClientMessage::Heartbeat { client_time } => {
            let _ = direct_tx.send(ServerMessage::HeartbeatAck {
                client_time,
                server_time: chrono::Utc::now().timestamp_millis(),
            });
        }

        ClientMessage::Disconnect { reason } => {
            tracing::debug!(%player_id, %reason, "client requested disconnect");
            return Ok(Flow::Close);
        }

        ClientMessage::JoinRoom { room_id, name } => {
            let player = state
                .rooms
                .join(&room_id, player_id, &name, room_tx.clone())
                .await?;
            tracing::info!(%room_id, %player_id, name = %player.name, "joined room");
            guard.joined.insert(room_id);
        }

        ClientMessage::LeaveRoom { room_id } => {
            state.rooms.leave(&room_id, player_id).await?;
            tracing::info!(%room_id, %player_id, "left room");
            guard.joined.remove(&room_id);
        }

        ClientMessage::CreateRoom {
            room_id,
            rows,
            cols,
            mine_count,
        } => {
            let defaults = state.rooms.defaults();
            let config = RoomConfig::new(
                rows.unwrap_or(defaults.rows),
                cols.unwrap_or(defaults.cols),
                mine_count.unwrap_or(defaults.mine_count),
            );
            let room_id = state.rooms.create_room(room_id, config).await?;
            tracing::info!(%room_id, %player_id, "room created by client");
            let room = state.rooms.summary(&room_id).await?;
            let _ = direct_tx.send(ServerMessage::RoomDetails { room });
        }

        ClientMessage::GetRoom { room_id } => {
            let room = state.rooms.summary(&room_id).await?;
            let _ = direct_tx.send(ServerMessage::RoomDetails { room });
        }

        ClientMessage::ListRooms => {
            let rooms = state.rooms.list_rooms().await;
            let _ = direct_tx.send(ServerMessage::RoomList { rooms });
        }

        ClientMessage::Reveal { room_id, row, col } => {
            state
                .rooms
                .reveal(&room_id, player_id, Coord::new(row, col))
                .await?;
        }

        ClientMessage::ToggleFlag { room_id, row, col } => {
            state
                .rooms
                .toggle_flag(&room_id, player_id, Coord::new(row, col))
                .await?;
        }

        ClientMessage::ResetGame { room_id } => {
            if !guard.joined.contains(&room_id) {
                // Surface a missing room as 404 before the membership check.
                state.rooms.get(&room_id).await?;
                return Err(RoomError::PlayerNotFound(player_id, room_id));
            }
            state.rooms.reset(&room_id).await?;
            tracing::info!(%room_id, %player_id, "game reset");
        }

        ClientMessage::SendMessage { room_id, text } => {
            state.rooms.send_message(&room_id, player_id, &text).await?;
        }
    }

    Ok(Flow::Continue)
}

/// The write half plus the outbound envelope counter.
struct Outbox {
    sink: WebSocketSender,
    state: Arc<ServerState>,
    start: Instant,
    seq: u64,
}

impl Outbox {
    /// Envelopes and sends one message. `false` once the socket is gone.
    async fn write(&mut self, body: ServerMessage) -> bool {
        let envelope = Envelope {
            seq: self.seq,
            timestamp: self.start.elapsed().as_millis() as u64,
            body,
        };
        self.seq += 1;

        let bytes = match self.state.codec.encode(&envelope) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(conn_id = %self.sink.id(), error = %e, "failed to encode message");
                return true;
            }
        };
        if let Err(e) = self.sink.send(bytes).await {
            tracing::debug!(conn_id = %self.sink.id(), error = %e, "send failed, stopping writer");
            return false;
        }
        true
    }
}

fn room_message(out: RoomOutbound) -> ServerMessage {
    ServerMessage::Room {
        room_id: out.room_id,
        event: out.event,
    }
}

/// Owns the sink and writes until the direct channel closes.
///
/// A room broadcasts an intent's events before it answers the handler,
/// so any room events already queued when a direct reply arrives were
/// caused earlier. They are flushed first to keep that order on the wire.
async fn write_loop(
    sink: WebSocketSender,
    mut direct_rx: mpsc::UnboundedReceiver<ServerMessage>,
    mut room_rx: mpsc::UnboundedReceiver<RoomOutbound>,
    state: Arc<ServerState>,
) {
    let mut outbox = Outbox {
        sink,
        state,
        start: Instant::now(),
        seq: 0,
    };

    loop {
        tokio::select! {
            msg = direct_rx.recv() => {
                let Some(msg) = msg else { break };
                while let Ok(out) = room_rx.try_recv() {
                    if !outbox.write(room_message(out)).await {
                        return;
                    }
                }
                if !outbox.write(msg).await {
                    return;
                }
            }
            Some(out) = room_rx.recv() => {
                if !outbox.write(room_message(out)).await {
                    return;
                }
            }
        }
    }

    let _ = outbox.sink.close().await;
}
