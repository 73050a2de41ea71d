//! Messages the server sends to clients.

use minehub_protocol::{PlayerId, RoomId};
use minehub_room::{ErrorKind, RoomError, RoomEvent, RoomSummary};
use serde::{Deserialize, Serialize};

/// Everything the server can send.
///
/// Adjacently tagged, so the payload sits under `data` and room events
/// keep their own `type` tag:
///
/// ```text
/// { "type": "Room", "data": { "room_id": "r1", "event": { "type": "CellsRevealed", … } } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    /// Reply to a valid `Hello`. `server_time` is Unix time in
    /// milliseconds.
    Welcome {
        player_id: PlayerId,
        server_time: i64,
    },

    /// Something happened in a room this connection has joined.
    Room { room_id: RoomId, event: RoomEvent },

    /// Reply to `CreateRoom` and `GetRoom`.
    RoomDetails { room: RoomSummary },

    /// Reply to `ListRooms`.
    RoomList { rooms: Vec<RoomSummary> },

    HeartbeatAck {
        client_time: u64,
        server_time: i64,
    },

    /// A request failed. Sent only to the connection that made it.
    Error { code: u16, message: String },
}

impl ServerMessage {
    /// Builds the `Error` reply for a failed room operation.
    pub fn from_room_error(err: &RoomError) -> Self {
        Self::Error {
            code: error_code(err.kind()),
            message: err.to_string(),
        }
    }
}

/// HTTP-style status code for an error class.
pub fn error_code(kind: ErrorKind) -> u16 {
    match kind {
        ErrorKind::NotFound => 404,
        ErrorKind::InvalidState => 409,
        ErrorKind::InvalidInput => 400,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minehub_board::BoardError;
    use minehub_protocol::Coord;

    #[test]
    fn test_error_code_per_kind() {
        assert_eq!(error_code(ErrorKind::NotFound), 404);
        assert_eq!(error_code(ErrorKind::InvalidState), 409);
        assert_eq!(error_code(ErrorKind::InvalidInput), 400);
    }

    #[test]
    fn test_from_room_error_uses_kind_and_display() {
        let msg = ServerMessage::from_room_error(&RoomError::InvalidMove(BoardError::OutOfBounds(
            Coord::new(10, 0),
        )));
        assert_eq!(
            msg,
            ServerMessage::Error {
                code: 400,
                message: "invalid move: cell (10, 0) is out of bounds".into(),
            }
        );
    }

    #[test]
    fn test_server_message_json_shape() {
        let msg = ServerMessage::Room {
            room_id: RoomId::from("r1"),
            event: RoomEvent::FlagToggled {
                player_id: PlayerId(2),
                row: 0,
                col: 1,
                flagged: true,
            },
        };
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "Room");
        assert_eq!(json["data"]["room_id"], "r1");
        assert_eq!(json["data"]["event"]["type"], "FlagToggled");
    }

    #[test]
    fn test_welcome_round_trips() {
        let msg = ServerMessage::Welcome {
            player_id: PlayerId(9),
            server_time: 1_700_000_000_000,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(serde_json::from_str::<ServerMessage>(&json).unwrap(), msg);
    }
}
