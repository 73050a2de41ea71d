//! The rectangular grid of cells.

use minehub_protocol::Coord;
use serde::{Deserialize, Serialize};

use crate::{BoardError, Cell, CellView, validate_dimensions};

/// Moore-neighborhood offsets in row-major order. The flood fill walks
/// neighbors in exactly this order, which keeps reveal output
/// reproducible.
const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// In-bounds neighbors of `at` on a `rows x cols` grid.
pub(crate) fn neighbors(
    at: Coord,
    rows: usize,
    cols: usize,
) -> impl DoubleEndedIterator<Item = Coord> {
    NEIGHBOR_OFFSETS.iter().filter_map(move |&(dr, dc)| {
        let row = at.row.checked_add_signed(dr)?;
        let col = at.col.checked_add_signed(dc)?;
        (row < rows && col < cols).then_some(Coord::new(row, col))
    })
}

/// A `rows x cols` minefield, stored row-major.
///
/// Invariant: exactly `mine_count` cells are mines, and every safe cell's
/// `adjacent_mines` matches its neighborhood. Both hold from construction
/// on; nothing in the public API can move a mine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    rows: usize,
    cols: usize,
    mine_count: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Builds a board from an explicit list of mine positions.
    ///
    /// Used for deterministic setups (tests, puzzles). Random boards come
    /// from [`generate`](crate::generate).
    pub fn from_mines(rows: usize, cols: usize, mines: &[Coord]) -> Result<Self, BoardError> {
        validate_dimensions(rows, cols, mines.len())?;
        let mut mask = vec![false; rows * cols];
        for &mine in mines {
            if mine.row >= rows || mine.col >= cols {
                return Err(BoardError::OutOfBounds(mine));
            }
            let slot = &mut mask[mine.row * cols + mine.col];
            if *slot {
                return Err(BoardError::DuplicateMine(mine));
            }
            *slot = true;
        }
        Ok(Self::from_mask(rows, cols, mask))
    }

    /// Builds a board from a row-major mine mask and fills in adjacency
    /// counts. The caller guarantees `mask.len() == rows * cols`.
    pub(crate) fn from_mask(rows: usize, cols: usize, mask: Vec<bool>) -> Self {
        let mine_count = mask.iter().filter(|&&m| m).count();
        let mut cells: Vec<Cell> = mask
            .iter()
            .map(|&is_mine| Cell {
                is_mine,
                ..Cell::default()
            })
            .collect();

        for row in 0..rows {
            for col in 0..cols {
                let idx = row * cols + col;
                if mask[idx] {
                    continue;
                }
                let count = neighbors(Coord::new(row, col), rows, cols)
                    .filter(|n| mask[n.row * cols + n.col])
                    .count();
                // At most 8 neighbors.
                cells[idx].adjacent_mines = count as u8;
            }
        }

        Self {
            rows,
            cols,
            mine_count,
            cells,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn mine_count(&self) -> usize {
        self.mine_count
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn in_bounds(&self, at: Coord) -> bool {
        at.row < self.rows && at.col < self.cols
    }

    /// Returns the cell at `at`, or `None` when out of bounds.
    pub fn cell(&self, at: Coord) -> Option<&Cell> {
        self.index(at).map(|i| &self.cells[i])
    }

    pub(crate) fn cell_mut(&mut self, at: Coord) -> Option<&mut Cell> {
        self.index(at).map(|i| &mut self.cells[i])
    }

    fn index(&self, at: Coord) -> Option<usize> {
        self.in_bounds(at).then(|| at.row * self.cols + at.col)
    }

    /// In-bounds neighbors of `at`, in row-major offset order.
    pub fn neighbors(&self, at: Coord) -> impl DoubleEndedIterator<Item = Coord> + use<> {
        neighbors(at, self.rows, self.cols)
    }

    /// Iterates every cell with its coordinate, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &Cell)> {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (Coord::new(i / cols, i % cols), cell))
    }

    /// Checks the preconditions of a reveal at `at`.
    ///
    /// # Errors
    /// `OutOfBounds`, `AlreadyRevealed`, or `Flagged`.
    pub fn check_revealable(&self, at: Coord) -> Result<(), BoardError> {
        let cell = self.cell(at).ok_or(BoardError::OutOfBounds(at))?;
        if cell.is_revealed {
            return Err(BoardError::AlreadyRevealed(at));
        }
        if cell.is_flagged {
            return Err(BoardError::Flagged(at));
        }
        Ok(())
    }

    /// Flips the flag on an unrevealed cell and returns the new state.
    ///
    /// # Errors
    /// `OutOfBounds`, or `AlreadyRevealed` (revealed cells can't be
    /// flagged or unflagged).
    pub fn toggle_flag(&mut self, at: Coord) -> Result<bool, BoardError> {
        let cell = self.cell_mut(at).ok_or(BoardError::OutOfBounds(at))?;
        if cell.is_revealed {
            return Err(BoardError::AlreadyRevealed(at));
        }
        cell.is_flagged = !cell.is_flagged;
        Ok(cell.is_flagged)
    }

    /// Number of safe cells still hidden. Zero means the board is cleared.
    pub fn unrevealed_safe_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| !c.is_revealed && !c.is_mine)
            .count()
    }

    /// Returns `true` once every safe cell is revealed.
    pub fn is_cleared(&self) -> bool {
        self.unrevealed_safe_count() == 0
    }

    /// Positions of every mine, row-major.
    pub fn mines(&self) -> Vec<Coord> {
        self.iter()
            .filter(|(_, cell)| cell.is_mine)
            .map(|(at, _)| at)
            .collect()
    }

    /// Client-safe view of the whole board.
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            rows: self.rows,
            cols: self.cols,
            mine_count: self.mine_count,
            cells: self.iter().map(|(at, cell)| cell.view(at)).collect(),
        }
    }
}

/// Masked board sent to a client on join and on reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub rows: usize,
    pub cols: usize,
    pub mine_count: usize,
    pub cells: Vec<CellView>,
}
