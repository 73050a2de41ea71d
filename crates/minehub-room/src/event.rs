//! Events a room pushes to its members.

use minehub_board::RevealedCell;
use minehub_protocol::{Coord, PlayerId, RoomId};
use serde::{Deserialize, Serialize};

use crate::{ChatMessage, GameSummary, Player, RoomSnapshot};

/// A state change inside a room.
///
/// Internally tagged so each event reads naturally in JSON:
///
/// ```text
/// { "type": "FlagToggled", "player_id": 3, "row": 1, "col": 4, "flagged": true }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RoomEvent {
    /// Full room state, sent only to the player who just joined.
    GameState { snapshot: RoomSnapshot },

    /// Someone joined. `players` is the roster afterwards.
    PlayerJoined { player: Player, players: Vec<Player> },

    /// Someone left. `players` is the roster afterwards.
    PlayerLeft {
        player_id: PlayerId,
        players: Vec<Player>,
    },

    /// The cells one reveal uncovered, in reveal order.
    CellsRevealed {
        player_id: PlayerId,
        cells: Vec<RevealedCell>,
        hit_mine: bool,
        score: u32,
    },

    FlagToggled {
        player_id: PlayerId,
        row: usize,
        col: usize,
        flagged: bool,
    },

    /// The player stepped on the mine at `at`.
    PlayerEliminated { player_id: PlayerId, at: Coord },

    GameFinished { summary: GameSummary },

    /// A new board was dealt; the snapshot is the fresh masked state.
    GameReset { snapshot: RoomSnapshot },

    MessageReceived { message: ChatMessage },
}

/// An event tagged with the room it came from. A connection can sit in
/// several rooms and reads them all from one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomOutbound {
    pub room_id: RoomId,
    pub event: RoomEvent,
}
