//! The reveal algorithm: mine hit or flood fill.

use minehub_protocol::{Coord, PlayerId};
use serde::{Deserialize, Serialize};

use crate::board::neighbors;
use crate::{Board, RevealedCell};

/// The cells one reveal changed, in the order they were uncovered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealOutcome {
    pub revealed: Vec<RevealedCell>,
    pub hit_mine: bool,
}

impl RevealOutcome {
    /// Number of safe cells uncovered (what the acting player scores).
    pub fn safe_count(&self) -> usize {
        self.revealed.iter().filter(|c| !c.is_mine).count()
    }

    /// Returns `true` if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.revealed.is_empty()
    }
}

/// Reveals the cell at `at` on behalf of `player`.
///
/// - A mine is revealed alone and sets `hit_mine`.
/// - A safe cell starts a depth-first flood fill: each visited cell is
///   revealed and, if its adjacent count is zero, its neighbors are
///   visited too. Numbered cells stop the cascade. Mines, flagged cells
///   and already revealed cells are never visited.
///
/// The traversal uses an explicit stack but yields the same order as the
/// recursive formulation: neighbors are pushed in reverse so the first
/// offset is explored first. Each cell is revealed at most once.
///
/// Status and turn rules are the caller's business. A target that is out
/// of bounds, revealed, or flagged yields an empty outcome.
pub fn reveal(board: &mut Board, at: Coord, player: PlayerId) -> RevealOutcome {
    if board.check_revealable(at).is_err() {
        return RevealOutcome::default();
    }

    let (rows, cols) = (board.rows(), board.cols());
    let Some(target) = board.cell_mut(at) else {
        return RevealOutcome::default();
    };

    if target.is_mine {
        target.is_revealed = true;
        target.revealed_by = Some(player);
        return RevealOutcome {
            revealed: vec![RevealedCell {
                row: at.row,
                col: at.col,
                is_mine: true,
                adjacent_mines: 0,
                revealed_by: player,
            }],
            hit_mine: true,
        };
    }

    let mut revealed = Vec::new();
    let mut stack = vec![at];

    while let Some(coord) = stack.pop() {
        let Some(cell) = board.cell_mut(coord) else {
            continue;
        };
        if cell.is_revealed || cell.is_mine || cell.is_flagged {
            continue;
        }

        cell.is_revealed = true;
        cell.revealed_by = Some(player);
        revealed.push(RevealedCell {
            row: coord.row,
            col: coord.col,
            is_mine: false,
            adjacent_mines: cell.adjacent_mines,
            revealed_by: player,
        });

        if cell.adjacent_mines == 0 {
            stack.extend(neighbors(coord, rows, cols).rev());
        }
    }

    RevealOutcome {
        revealed,
        hit_mine: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const P: PlayerId = PlayerId(1);

    fn c(row: usize, col: usize) -> Coord {
        Coord::new(row, col)
    }

    fn coords(outcome: &RevealOutcome) -> Vec<Coord> {
        outcome.revealed.iter().map(RevealedCell::coord).collect()
    }

    #[test]
    fn test_reveal_mine_reveals_only_that_cell() {
        let mut board = Board::from_mines(3, 3, &[c(0, 0)]).unwrap();

        let outcome = reveal(&mut board, c(0, 0), P);

        assert!(outcome.hit_mine);
        assert_eq!(coords(&outcome), vec![c(0, 0)]);
        assert_eq!(outcome.safe_count(), 0);
        let cell = board.cell(c(0, 0)).unwrap();
        assert!(cell.is_revealed());
        assert_eq!(cell.revealed_by(), Some(P));
        // No cascade.
        assert_eq!(board.iter().filter(|(_, c)| c.is_revealed()).count(), 1);
    }

    #[test]
    fn test_reveal_numbered_cell_stops_at_itself() {
        let mut board = Board::from_mines(3, 3, &[c(0, 0)]).unwrap();

        let outcome = reveal(&mut board, c(1, 1), P);

        assert!(!outcome.hit_mine);
        assert_eq!(coords(&outcome), vec![c(1, 1)]);
        assert_eq!(outcome.revealed[0].adjacent_mines, 1);
    }

    #[test]
    fn test_reveal_zero_region_opens_region_and_border() {
        // Mine in the top-left corner of a 4x4 board. Revealing the far
        // corner opens every safe cell.
        let mut board = Board::from_mines(4, 4, &[c(0, 0)]).unwrap();

        let outcome = reveal(&mut board, c(3, 3), P);

        assert_eq!(outcome.revealed.len(), 15);
        assert!(board.is_cleared());
        assert!(!board.cell(c(0, 0)).unwrap().is_revealed());
    }

    #[test]
    fn test_reveal_visits_each_cell_once() {
        let mut board = Board::from_mines(6, 6, &[c(2, 2), c(5, 0)]).unwrap();

        let outcome = reveal(&mut board, c(0, 5), P);

        let unique: HashSet<_> = coords(&outcome).into_iter().collect();
        assert_eq!(unique.len(), outcome.revealed.len());
    }

    #[test]
    fn test_reveal_order_matches_recursive_preorder() {
        // 1x4 strip with a mine at the end: . . . *
        // Recursive DFS from (0,0): (0,0) → (0,1) → (0,2) [count 1, stop].
        let mut board = Board::from_mines(1, 4, &[c(0, 3)]).unwrap();

        let outcome = reveal(&mut board, c(0, 0), P);

        assert_eq!(coords(&outcome), vec![c(0, 0), c(0, 1), c(0, 2)]);
        assert_eq!(outcome.revealed[2].adjacent_mines, 1);
    }

    #[test]
    fn test_reveal_order_first_neighbor_subtree_first() {
        // 2x3, no mines. From (0,0) the first neighbor in row-major offset
        // order is (0,1); its subtree is finished before (1,0) is touched.
        let mut board = Board::from_mines(2, 3, &[]).unwrap();

        let outcome = reveal(&mut board, c(0, 0), P);

        assert_eq!(
            coords(&outcome),
            vec![c(0, 0), c(0, 1), c(0, 2), c(1, 1), c(1, 0), c(1, 2)]
        );
    }

    #[test]
    fn test_reveal_flood_skips_flagged_cells() {
        let mut board = Board::from_mines(1, 5, &[]).unwrap();
        board.toggle_flag(c(0, 2)).unwrap();

        let outcome = reveal(&mut board, c(0, 0), P);

        assert_eq!(coords(&outcome), vec![c(0, 0), c(0, 1)]);
        assert!(!board.cell(c(0, 3)).unwrap().is_revealed());
    }

    #[test]
    fn test_reveal_flagged_target_is_noop() {
        let mut board = Board::from_mines(2, 2, &[]).unwrap();
        board.toggle_flag(c(0, 0)).unwrap();

        let outcome = reveal(&mut board, c(0, 0), P);

        assert!(outcome.is_empty());
        assert!(!board.cell(c(0, 0)).unwrap().is_revealed());
    }

    #[test]
    fn test_reveal_already_revealed_is_noop() {
        let mut board = Board::from_mines(2, 2, &[c(1, 1)]).unwrap();
        reveal(&mut board, c(0, 0), P);
        let before = board.clone();

        let outcome = reveal(&mut board, c(0, 0), PlayerId(2));

        assert!(outcome.is_empty());
        assert_eq!(board, before);
    }

    #[test]
    fn test_reveal_out_of_bounds_is_noop() {
        let mut board = Board::from_mines(2, 2, &[]).unwrap();
        assert!(reveal(&mut board, c(9, 9), P).is_empty());
    }

    #[test]
    fn test_reveal_attributes_every_cell_to_player() {
        let mut board = Board::from_mines(3, 3, &[]).unwrap();

        let outcome = reveal(&mut board, c(1, 1), PlayerId(7));

        assert_eq!(outcome.revealed.len(), 9);
        assert!(outcome.revealed.iter().all(|c| c.revealed_by == PlayerId(7)));
        assert!(board.iter().all(|(_, c)| c.revealed_by() == Some(PlayerId(7))));
    }
}
