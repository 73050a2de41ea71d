//! Error types for the room layer.

use minehub_board::BoardError;
use minehub_protocol::{PlayerId, RoomId};

use crate::RoomStatus;

/// Errors that can occur during room operations.
///
/// None of these are fatal: the room's state is unchanged when one is
/// returned, and other rooms never notice.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// `create_room` was called with an id that is already taken.
    #[error("room {0} already exists")]
    AlreadyExists(RoomId),

    /// The player is not in this room.
    #[error("player {0} not in room {1}")]
    PlayerNotFound(PlayerId, RoomId),

    /// The player is already in this room.
    #[error("player {0} already in room {1}")]
    AlreadyInRoom(PlayerId, RoomId),

    /// The room's status doesn't allow this operation, e.g. revealing
    /// after the game was won.
    #[error("room {room_id} is {status}")]
    InvalidState { room_id: RoomId, status: RoomStatus },

    /// The player hit a mine and sits out until the next reset.
    #[error("player {0} has been eliminated")]
    PlayerEliminated(PlayerId),

    /// The board refused the move (out of bounds, already revealed,
    /// flagged).
    #[error("invalid move: {0}")]
    InvalidMove(#[source] BoardError),

    /// The room config can't produce a board.
    #[error("invalid room config: {0}")]
    InvalidConfig(#[source] BoardError),

    /// Chat text was empty after trimming.
    #[error("message is empty")]
    EmptyMessage,

    /// The room's command channel is closed: the room shut down.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}

/// Coarse classification of a [`RoomError`], for callers that only need
/// to decide how to report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidState,
    InvalidInput,
}

impl RoomError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) | Self::PlayerNotFound(..) => ErrorKind::NotFound,
            Self::AlreadyExists(_)
            | Self::AlreadyInRoom(..)
            | Self::InvalidState { .. }
            | Self::PlayerEliminated(_)
            | Self::Unavailable(_) => ErrorKind::InvalidState,
            Self::InvalidMove(_) | Self::InvalidConfig(_) | Self::EmptyMessage => {
                ErrorKind::InvalidInput
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minehub_protocol::Coord;

    #[test]
    fn test_kind_classifies_every_variant() {
        let room = RoomId::from("r1");
        assert_eq!(RoomError::NotFound(room.clone()).kind(), ErrorKind::NotFound);
        assert_eq!(
            RoomError::PlayerNotFound(PlayerId(1), room.clone()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            RoomError::InvalidState {
                room_id: room.clone(),
                status: RoomStatus::Won
            }
            .kind(),
            ErrorKind::InvalidState
        );
        assert_eq!(RoomError::AlreadyExists(room).kind(), ErrorKind::InvalidState);
        assert_eq!(
            RoomError::InvalidMove(BoardError::OutOfBounds(Coord::new(9, 9))).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(RoomError::EmptyMessage.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_display_includes_context() {
        let err = RoomError::InvalidState {
            room_id: RoomId::from("lobby"),
            status: RoomStatus::Lost,
        };
        assert_eq!(err.to_string(), "room lobby is Lost");

        let err = RoomError::InvalidMove(BoardError::Flagged(Coord::new(1, 2)));
        assert_eq!(err.to_string(), "invalid move: cell (1, 2) is flagged");
    }
}
