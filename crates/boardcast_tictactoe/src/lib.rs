//! Pure tic-tac-toe game logic for the boardcast server.
//!
//! This crate holds the single source of truth for a game: the board,
//! whose turn it is, and whether the game has ended. It performs no I/O.
//!
//! # Example
//!
//! ```
//! use boardcast_tictactoe::{GameState, GameStatus, Mark};
//!
//! let mut game = GameState::new();
//! for index in [0, 1, 3, 4, 6] {
//!     game.apply_move(index).unwrap();
//! }
//! assert_eq!(game.status(), &GameStatus::Won(Mark::X));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod game;
mod invariants;
mod position;
mod rules;
mod types;

pub use action::{Move, MoveError};
pub use game::{GameState, Snapshot};
pub use invariants::{
    AlternatingTurnInvariant, HistoryConsistentInvariant, Invariant, InvariantViolation,
    check_invariants,
};
pub use position::Position;
pub use rules::{LINES, check_winner, is_full};
pub use types::{Board, GameStatus, Mark, Square};
