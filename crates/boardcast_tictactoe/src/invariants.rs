//! Invariants that must hold for every reachable [`GameState`].
//!
//! Checked in debug builds after each accepted move and usable directly
//! from tests.

use crate::game::GameState;
use crate::types::{Board, Mark, Square};

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("Invariant violated: {description}")]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// Invariant: marks alternate X, O, X, ... and the turn marker agrees.
///
/// While in progress the next mark follows the history length; once the
/// game is over the turn marker stays on the last mover.
pub struct AlternatingTurnInvariant;

impl Invariant<GameState> for AlternatingTurnInvariant {
    fn holds(game: &GameState) -> bool {
        let history = game.history();

        let alternates = history
            .iter()
            .enumerate()
            .all(|(i, mv)| mv.mark == if i % 2 == 0 { Mark::X } else { Mark::O });
        if !alternates {
            return false;
        }

        match history.last() {
            Some(last) if game.is_over() => game.current_player() == last.mark,
            Some(last) => game.current_player() == last.mark.opponent(),
            None => game.current_player() == Mark::X && !game.is_over(),
        }
    }

    fn description() -> &'static str {
        "Marks alternate starting with X"
    }
}

/// Invariant: the board is exactly the replay of the move history.
///
/// Each square is filled at most once, so no position repeats.
pub struct HistoryConsistentInvariant;

impl Invariant<GameState> for HistoryConsistentInvariant {
    fn holds(game: &GameState) -> bool {
        let mut replay = Board::new();
        for mv in game.history() {
            if !replay.is_empty(mv.position) {
                return false;
            }
            replay.set(mv.position, Square::Occupied(mv.mark));
        }
        &replay == game.board()
    }

    fn description() -> &'static str {
        "Board matches the replayed move history"
    }
}

/// Checks every game invariant.
///
/// # Errors
///
/// Returns each violated invariant.
pub fn check_invariants(game: &GameState) -> Result<(), Vec<InvariantViolation>> {
    let mut violations = Vec::new();

    if !AlternatingTurnInvariant::holds(game) {
        violations.push(InvariantViolation::new(AlternatingTurnInvariant::description()));
    }

    if !HistoryConsistentInvariant::holds(game) {
        violations.push(InvariantViolation::new(
            HistoryConsistentInvariant::description(),
        ));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}
