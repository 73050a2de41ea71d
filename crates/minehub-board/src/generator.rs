//! Random mine placement.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::{Board, BoardError};

/// Largest board accepted, in cells (64x64).
pub const MAX_CELLS: usize = 4096;

/// Checks that a `rows x cols` board with `mine_count` mines can exist.
///
/// `mine_count == rows * cols` is allowed: an all-mines board is
/// degenerate but well defined.
///
/// # Errors
/// `InvalidDimensions` for a zero side or more than [`MAX_CELLS`] cells,
/// `TooManyMines` when the mines don't fit.
pub fn validate_dimensions(rows: usize, cols: usize, mine_count: usize) -> Result<(), BoardError> {
    let cells = rows
        .checked_mul(cols)
        .filter(|&n| n > 0 && n <= MAX_CELLS)
        .ok_or(BoardError::InvalidDimensions { rows, cols })?;
    if mine_count > cells {
        return Err(BoardError::TooManyMines {
            mines: mine_count,
            cells,
        });
    }
    Ok(())
}

/// Builds a fresh board with `mine_count` mines placed uniformly at random
/// without replacement.
///
/// Sparse boards use rejection sampling: draw a random `(row, col)` and
/// keep it if it isn't a mine yet. Past half density the expected number
/// of retries grows without bound, so dense boards shuffle the cell
/// indices instead and take the first `mine_count`.
pub fn generate<R: Rng + ?Sized>(
    rows: usize,
    cols: usize,
    mine_count: usize,
    rng: &mut R,
) -> Result<Board, BoardError> {
    validate_dimensions(rows, cols, mine_count)?;
    let cells = rows * cols;
    let mut mask = vec![false; cells];

    if mine_count * 2 > cells {
        tracing::debug!(rows, cols, mine_count, "dense board, placing mines by shuffle");
        let mut indices: Vec<usize> = (0..cells).collect();
        let (chosen, _) = indices.partial_shuffle(rng, mine_count);
        for &i in chosen.iter() {
            mask[i] = true;
        }
    } else {
        let mut placed = 0;
        while placed < mine_count {
            let row = rng.random_range(0..rows);
            let col = rng.random_range(0..cols);
            let slot = &mut mask[row * cols + col];
            if !*slot {
                *slot = true;
                placed += 1;
            }
        }
    }

    Ok(Board::from_mask(rows, cols, mask))
}
