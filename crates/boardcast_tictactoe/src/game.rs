//! The canonical game state and its transitions.

use crate::action::{Move, MoveError};
use crate::invariants::check_invariants;
use crate::position::Position;
use crate::rules::{check_winner, is_full};
use crate::types::{Board, GameStatus, Mark, Square};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Complete game state.
///
/// Board and turn are frozen once the status is terminal; only
/// [`GameState::reset`] brings the game back into progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    board: Board,
    turn: Mark,
    status: GameStatus,
    history: Vec<Move>,
}

/// Owned, read-only projection of a [`GameState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Marks in row-major order, `None` for empty squares.
    pub board: [Option<Mark>; 9],
    /// Mark entitled to move next (the last mover once the game is over).
    pub current_player: Mark,
    /// Game status.
    pub status: GameStatus,
}

impl Snapshot {
    /// True once the game has been won or drawn.
    pub fn game_over(&self) -> bool {
        self.status.is_terminal()
    }
}

impl GameState {
    /// Creates a fresh game: empty board, X to move.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            turn: Mark::X,
            status: GameStatus::InProgress,
            history: Vec::new(),
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the mark entitled to move next.
    pub fn current_player(&self) -> Mark {
        self.turn
    }

    /// Returns the game status.
    pub fn status(&self) -> &GameStatus {
        &self.status
    }

    /// Returns the moves played since the last reset.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// True once the game has been won or drawn.
    pub fn is_over(&self) -> bool {
        self.status.is_terminal()
    }

    /// Places the current player's mark at `index` (0-8).
    ///
    /// Preconditions are checked in order: the game is in progress, the
    /// index is on the board, the square is empty. A win is checked before
    /// a draw, so a move that fills the board and completes a line wins.
    ///
    /// # Errors
    ///
    /// Returns the first failed precondition; the state is left untouched.
    #[instrument(skip(self), fields(turn = %self.turn))]
    pub fn apply_move(&mut self, index: usize) -> Result<Snapshot, MoveError> {
        if self.is_over() {
            return Err(MoveError::GameAlreadyOver);
        }

        let position = Position::from_index(index).ok_or(MoveError::InvalidIndex(index))?;

        if !self.board.is_empty(position) {
            return Err(MoveError::CellOccupied(position));
        }

        let mark = self.turn;
        self.board.set(position, Square::Occupied(mark));
        self.history.push(Move::new(mark, position));

        if let Some(winner) = check_winner(&self.board) {
            info!(%winner, "Game won");
            self.status = GameStatus::Won(winner);
        } else if is_full(&self.board) {
            info!("Game drawn");
            self.status = GameStatus::Draw;
        } else {
            self.turn = mark.opponent();
        }

        debug_assert!(
            check_invariants(self).is_ok(),
            "invariants violated after {position}"
        );
        debug!(%position, %mark, status = ?self.status, "Move applied");

        Ok(self.snapshot())
    }

    /// Clears the board and starts a new game with X to move.
    ///
    /// Always succeeds, whatever the current status.
    #[instrument(skip(self))]
    pub fn reset(&mut self) -> Snapshot {
        info!(moves = self.history.len(), "Resetting game");
        self.board = Board::new();
        self.turn = Mark::X;
        self.status = GameStatus::InProgress;
        self.history.clear();
        self.snapshot()
    }

    /// Returns an owned projection of the current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: self.board.marks(),
            current_player: self.turn,
            status: self.status,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
