//! Per-cell state and the two client-facing projections of it.

use minehub_protocol::{Coord, PlayerId};
use serde::{Deserialize, Serialize};

/// One square of the board.
///
/// Fields are only mutable inside this crate: `adjacent_mines` is fixed
/// when the board is built, and the revealed/flagged bits only change
/// through [`Board::toggle_flag`](crate::Board::toggle_flag) and
/// [`reveal`](crate::reveal).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub(crate) is_mine: bool,
    pub(crate) is_revealed: bool,
    pub(crate) is_flagged: bool,
    pub(crate) adjacent_mines: u8,
    pub(crate) revealed_by: Option<PlayerId>,
}

impl Cell {
    pub fn is_mine(&self) -> bool {
        self.is_mine
    }

    pub fn is_revealed(&self) -> bool {
        self.is_revealed
    }

    pub fn is_flagged(&self) -> bool {
        self.is_flagged
    }

    /// Number of mines among the up-to-8 neighbors. Always 0 for mines.
    pub fn adjacent_mines(&self) -> u8 {
        self.adjacent_mines
    }

    /// The player whose reveal uncovered this cell.
    pub fn revealed_by(&self) -> Option<PlayerId> {
        self.revealed_by
    }

    /// Masked view for clients: hidden cells expose nothing but their
    /// flag.
    pub fn view(&self, at: Coord) -> CellView {
        let shown = self.is_revealed;
        CellView {
            row: at.row,
            col: at.col,
            is_revealed: shown,
            is_flagged: self.is_flagged,
            is_mine: shown.then_some(self.is_mine),
            adjacent_mines: (shown && !self.is_mine).then_some(self.adjacent_mines),
            revealed_by: self.revealed_by,
        }
    }
}

/// What a client may know about a cell.
///
/// `is_mine` and `adjacent_mines` are `None` until the cell is revealed,
/// so a board snapshot never leaks mine positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellView {
    pub row: usize,
    pub col: usize,
    pub is_revealed: bool,
    pub is_flagged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_mine: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjacent_mines: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revealed_by: Option<PlayerId>,
}

/// A cell that changed during one reveal, as broadcast to the room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealedCell {
    pub row: usize,
    pub col: usize,
    pub is_mine: bool,
    pub adjacent_mines: u8,
    pub revealed_by: PlayerId,
}

impl RevealedCell {
    pub fn coord(&self) -> Coord {
        Coord::new(self.row, self.col)
    }
}
