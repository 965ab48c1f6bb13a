//! A perfect-play solver for the board game 'Connect 4'
//!
//! Given any legal position, the solver returns the game-theoretic score
//! under optimal play by both sides: positive if the side to move can force
//! a win, negative if it is bound to lose, zero for a draw. The magnitude
//! counts how many plies the winner has to spare at the forced end of the game.
//!
//! # Basic Usage
//!
//! ```
//! use connect4_solver::{bitboard::BitBoard, solver::Solver};
//!
//!# use std::error::Error;
//!# fn main() -> Result<(), Box<dyn Error>> {
//! let mut board = BitBoard::from_moves("112233")?;
//! let mut solver = Solver::new();
//!
//! assert_eq!(solver.solve(&mut board), 18);
//! assert_eq!(solver.best_move(&mut board), 3);
//!# Ok(())
//!# }
//! ```

use static_assertions::*;
pub use anyhow;

pub mod transposition_table;

pub mod bitboard;

pub mod render;

pub mod solver;

mod test;

pub use bitboard::BitBoard;
pub use render::{GameBoard, GameState};
pub use solver::Solver;
pub use transposition_table::TranspositionTable;

/// The width of the game board in tiles
pub const WIDTH: usize = 7;

/// The height of the game board in tiles
pub const HEIGHT: usize = 6;

// ensure that the given dimensions fit in a u64 for the bitboard representation
const_assert!(WIDTH * (HEIGHT + 1) < 64);
