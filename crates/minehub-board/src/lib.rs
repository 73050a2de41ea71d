//! Board model and game algorithms for minehub.
//!
//! Everything here is synchronous and free of I/O: a [`Board`] is a plain
//! value, [`generate`] builds one from a random source, and [`reveal`]
//! mutates one in place. The room layer decides *when* these run; this
//! crate only decides *what* they do.
//!
//! # Key types
//!
//! - [`Board`] / [`Cell`] — the authoritative grid
//! - [`generate`] — uniform mine placement plus adjacency counts
//! - [`reveal`] — mine hit or flood fill, returning a [`RevealOutcome`]
//! - [`BoardSnapshot`] / [`CellView`] — what clients are allowed to see

mod board;
mod cell;
mod error;
mod generator;
mod reveal;

pub use board::{Board, BoardSnapshot};
pub use cell::{Cell, CellView, RevealedCell};
pub use error::BoardError;
pub use generator::{MAX_CELLS, generate, validate_dimensions};
pub use reveal::{RevealOutcome, reveal};
