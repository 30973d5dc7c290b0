//! First-class invariants for game states.
//!
//! Invariants are logical properties that must hold for every reachable
//! state. The rule engine asserts them in debug builds after each move;
//! the codec enforces them on every decoded state.

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
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

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.description)
    }
}

/// A set of invariants that can be checked together.
///
/// Implemented for the 4-tuple behind [`GameStateInvariants`].
pub trait InvariantSet<S> {
    /// Checks all invariants in the set.
    ///
    /// Returns Ok(()) if all invariants hold, or Err with a list of
    /// violations if any invariant fails.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

fn check_one<S, I: Invariant<S>>(state: &S, violations: &mut Vec<InvariantViolation>) {
    if !I::holds(state) {
        violations.push(InvariantViolation::new(I::description()));
    }
}

fn into_result(violations: Vec<InvariantViolation>) -> Result<(), Vec<InvariantViolation>> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

// Implement InvariantSet for 4-tuples
impl<S, I1, I2, I3, I4> InvariantSet<S> for (I1, I2, I3, I4)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
    I4: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();
        check_one::<S, I1>(state, &mut violations);
        check_one::<S, I2>(state, &mut violations);
        check_one::<S, I3>(state, &mut violations);
        check_one::<S, I4>(state, &mut violations);
        into_result(violations)
    }
}

pub mod alternating_turn;
pub mod ledger_consistent;
pub mod outcome_consistent;
pub mod piece_cap;

pub use alternating_turn::AlternatingTurnInvariant;
pub use ledger_consistent::LedgerConsistentInvariant;
pub use outcome_consistent::OutcomeConsistentInvariant;
pub use piece_cap::PieceCapInvariant;

/// All game state invariants as a composable set.
pub type GameStateInvariants = (
    PieceCapInvariant,
    LedgerConsistentInvariant,
    AlternatingTurnInvariant,
    OutcomeConsistentInvariant,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Coordinates, GameState, Player, Position, Square};

    #[test]
    fn test_invariant_set_holds_for_empty_game() {
        assert!(GameStateInvariants::check_all(&GameState::classic()).is_ok());
        assert!(GameStateInvariants::check_all(&GameState::infinite()).is_ok());
    }

    #[test]
    fn test_invariant_set_holds_through_long_infinite_game() {
        let mut game = GameState::infinite();
        // Cycles without completing a line for either side.
        for index in [0, 1, 2, 4, 3, 5, 7, 6, 8, 0, 1, 2] {
            let player = game.side_to_act();
            match game.apply_move(Coordinates::from_index(index), player) {
                Ok(next) => game = next,
                Err(_) => break,
            }
            assert!(GameStateInvariants::check_all(&game).is_ok());
        }
    }

    #[test]
    fn test_invariant_set_detects_violations() {
        let mut game = GameState::classic()
            .apply_move(Position::Center, Player::X)
            .expect("legal move");
        game.board.set(Position::TopLeft, Square::Occupied(Player::O));

        let violations = GameStateInvariants::check_all(&game).unwrap_err();
        assert!(!violations.is_empty());
    }
}
