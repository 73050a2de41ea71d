//! Seeded property checks for board generation and reveal.
//!
//! Each test sweeps a handful of seeds and shapes and compares the board
//! against an independent, straightforward recomputation.

use std::collections::{HashSet, VecDeque};

use minehub_board::{Board, generate, reveal};
use minehub_protocol::{Coord, PlayerId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SHAPES: [(usize, usize, usize); 6] = [
    (1, 1, 0),
    (1, 8, 2),
    (5, 5, 3),
    (9, 9, 10),
    (8, 13, 60),
    (16, 30, 99),
];

fn boards() -> impl Iterator<Item = (u64, Board)> {
    SHAPES.into_iter().flat_map(|(rows, cols, mines)| {
        (0..8u64).map(move |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (seed, generate(rows, cols, mines, &mut rng).unwrap())
        })
    })
}

fn is_mine(board: &Board, row: isize, col: isize) -> bool {
    if row < 0 || col < 0 {
        return false;
    }
    board
        .cell(Coord::new(row as usize, col as usize))
        .is_some_and(|c| c.is_mine())
}

/// Breadth-first reference flood fill. Order differs from the real one,
/// the revealed set must not.
fn reference_region(board: &Board, start: Coord) -> HashSet<Coord> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([start]);
    while let Some(at) = queue.pop_front() {
        let Some(cell) = board.cell(at) else { continue };
        if cell.is_mine() || cell.is_flagged() || cell.is_revealed() || !seen.insert(at) {
            continue;
        }
        if cell.adjacent_mines() == 0 {
            queue.extend(board.neighbors(at));
        }
    }
    seen
}

#[test]
fn test_generated_boards_have_exact_mine_count() {
    for (seed, board) in boards() {
        let counted = board.iter().filter(|(_, c)| c.is_mine()).count();
        assert_eq!(counted, board.mine_count(), "seed {seed}");
        assert_eq!(board.mines().len(), board.mine_count(), "seed {seed}");
    }
}

#[test]
fn test_generated_adjacency_matches_neighborhood() {
    for (seed, board) in boards() {
        for (at, cell) in board.iter() {
            if cell.is_mine() {
                continue;
            }
            let (r, c) = (at.row as isize, at.col as isize);
            let mut expected = 0;
            for dr in -1..=1 {
                for dc in -1..=1 {
                    if (dr, dc) != (0, 0) && is_mine(&board, r + dr, c + dc) {
                        expected += 1;
                    }
                }
            }
            assert_eq!(cell.adjacent_mines(), expected, "seed {seed} at {at}");
        }
    }
}

#[test]
fn test_generated_boards_start_hidden() {
    for (seed, board) in boards() {
        assert!(
            board
                .iter()
                .all(|(_, c)| !c.is_revealed() && !c.is_flagged() && c.revealed_by().is_none()),
            "seed {seed}"
        );
    }
}

#[test]
fn test_reveal_matches_reference_flood_fill() {
    let player = PlayerId(1);
    for (seed, board) in boards() {
        let mut pick = StdRng::seed_from_u64(seed ^ 0xA5A5);
        for _ in 0..4 {
            let at = Coord::new(
                pick.random_range(0..board.rows()),
                pick.random_range(0..board.cols()),
            );
            let mut played = board.clone();
            let outcome = reveal(&mut played, at, player);

            if board.cell(at).unwrap().is_mine() {
                assert!(outcome.hit_mine, "seed {seed} at {at}");
                assert_eq!(outcome.revealed.len(), 1);
                continue;
            }

            let got: HashSet<Coord> = outcome.revealed.iter().map(|c| c.coord()).collect();
            assert_eq!(got.len(), outcome.revealed.len(), "duplicate cell, seed {seed}");
            assert_eq!(got, reference_region(&board, at), "seed {seed} at {at}");
            assert!(outcome.revealed.iter().all(|c| !c.is_mine));
            assert_eq!(outcome.revealed[0].coord(), at, "target comes first");
        }
    }
}

#[test]
fn test_reveal_never_uncovers_a_mine_through_cascade() {
    let player = PlayerId(3);
    for (seed, mut board) in boards() {
        let safe: Vec<Coord> = board
            .iter()
            .filter(|(_, c)| !c.is_mine())
            .map(|(at, _)| at)
            .collect();
        for at in safe {
            reveal(&mut board, at, player);
        }
        assert!(board.is_cleared(), "seed {seed}");
        assert!(
            board.iter().all(|(_, c)| c.is_mine() != c.is_revealed()),
            "seed {seed}"
        );
    }
}

#[test]
fn test_revealed_counts_only_increase() {
    let player = PlayerId(2);
    for (seed, mut board) in boards() {
        let mut pick = StdRng::seed_from_u64(seed);
        let mut shown = 0;
        for _ in 0..20 {
            let at = Coord::new(
                pick.random_range(0..board.rows()),
                pick.random_range(0..board.cols()),
            );
            let outcome = reveal(&mut board, at, player);
            let now = board.iter().filter(|(_, c)| c.is_revealed()).count();
            assert_eq!(now, shown + outcome.revealed.len(), "seed {seed}");
            shown = now;
        }
    }
}
