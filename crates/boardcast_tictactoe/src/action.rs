//! Moves and the reasons a move can be rejected.

use crate::position::Position;
use crate::types::Mark;
use serde::{Deserialize, Serialize};

/// A move: a mark placed at a position.
///
/// Recorded in the game history once accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// The mark that was placed.
    pub mark: Mark,
    /// Where it was placed.
    pub position: Position,
}

impl Move {
    /// Creates a new move.
    pub fn new(mark: Mark, position: Position) -> Self {
        Self { mark, position }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.mark, self.position)
    }
}

/// Why a move was rejected.
///
/// A rejected move never changes the game state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum MoveError {
    /// The game has been won or drawn and only accepts a reset.
    #[display("Game is already over")]
    GameAlreadyOver,

    /// The index is outside 0-8, or the move payload was malformed.
    #[display("Index {} is out of range (must be 0-8)", _0)]
    InvalidIndex(#[error(not(source))] usize),

    /// The target square already holds a mark.
    #[display("Square {} is already occupied", _0)]
    CellOccupied(#[error(not(source))] Position),
}

impl MoveError {
    /// Short machine-readable reason.
    pub fn reason(&self) -> &'static str {
        match self {
            MoveError::GameAlreadyOver => "already-over",
            MoveError::InvalidIndex(_) => "out-of-range",
            MoveError::CellOccupied(_) => "occupied",
        }
    }
}
