//! Error types for the board layer.

use minehub_protocol::Coord;

/// Errors raised while building or mutating a board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// A board needs at least one row and one column, and at most
    /// [`MAX_CELLS`](crate::MAX_CELLS) cells.
    #[error("invalid board dimensions {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    /// More mines were requested than the board has cells.
    #[error("{mines} mines do not fit on a board of {cells} cells")]
    TooManyMines { mines: usize, cells: usize },

    /// The coordinate lies outside the board.
    #[error("cell {0} is out of bounds")]
    OutOfBounds(Coord),

    /// The cell is already revealed.
    #[error("cell {0} is already revealed")]
    AlreadyRevealed(Coord),

    /// The cell carries a flag and cannot be revealed.
    #[error("cell {0} is flagged")]
    Flagged(Coord),

    /// The same cell was listed twice when building a board by hand.
    #[error("mine at {0} listed twice")]
    DuplicateMine(Coord),
}
