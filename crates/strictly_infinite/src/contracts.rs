//! Contract-based validation for move transitions.
//!
//! Contracts define correctness through preconditions and postconditions.
//! They formalize the Hoare-style reasoning: {P} action {Q}

use super::action::Rejection;
use super::invariants::{GameStateInvariants, InvariantSet, InvariantViolation};
use super::state::GameState;
use super::{Coordinates, Player, Position};
use derive_new::new;
use tracing::{debug, instrument};

// ─────────────────────────────────────────────────────────────
//  Contract Trait
// ─────────────────────────────────────────────────────────────

/// A contract defines preconditions and postconditions for state transitions.
///
/// - Precondition: {P(state, action)} - must hold before applying action
/// - Postcondition: {Q(before, after)} - must hold after applying action
pub trait Contract<S, A> {
    /// What a satisfied precondition hands to the transition.
    type Checked;

    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<Self::Checked, Rejection>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), Vec<InvariantViolation>>;
}

/// A side's request to place a piece, before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct Attempt {
    /// Side attempting the move.
    pub player: Player,
    /// Requested square, unvalidated.
    pub target: Coordinates,
}

// ─────────────────────────────────────────────────────────────
//  Move Preconditions
// ─────────────────────────────────────────────────────────────

/// Precondition: the game has no outcome yet.
pub struct GameNotOver;

impl GameNotOver {
    /// Fails with [`Rejection::GameOver`] once the game has ended.
    pub fn check(game: &GameState) -> Result<(), Rejection> {
        if game.is_game_over() {
            Err(Rejection::GameOver)
        } else {
            Ok(())
        }
    }
}

/// Precondition: the target lies on the board.
pub struct InBounds;

impl InBounds {
    /// Resolves the target to a position.
    pub fn check(attempt: &Attempt) -> Result<Position, Rejection> {
        Position::from_coordinates(attempt.target).ok_or(Rejection::OutOfBounds(attempt.target))
    }
}

/// Precondition: the square at the move's position must be empty.
pub struct SquareIsEmpty;

impl SquareIsEmpty {
    /// Fails with [`Rejection::Occupied`] when a piece sits there.
    pub fn check(position: Position, game: &GameState) -> Result<(), Rejection> {
        if game.board().is_empty(position) {
            Ok(())
        } else {
            Err(Rejection::Occupied(position))
        }
    }
}

/// Precondition: it must be the player's turn.
pub struct PlayersTurn;

impl PlayersTurn {
    /// Fails with [`Rejection::WrongTurn`] for the side not to act.
    pub fn check(attempt: &Attempt, game: &GameState) -> Result<(), Rejection> {
        if attempt.player != game.side_to_act() {
            Err(Rejection::WrongTurn {
                expected: game.side_to_act(),
                actual: attempt.player,
            })
        } else {
            Ok(())
        }
    }
}

/// Composite precondition, checked in a fixed order so a given bad
/// attempt always yields the same rejection.
pub struct LegalMove;

impl LegalMove {
    /// Validates all preconditions for a move.
    pub fn check(attempt: &Attempt, game: &GameState) -> Result<Position, Rejection> {
        GameNotOver::check(game)?;
        let position = InBounds::check(attempt)?;
        SquareIsEmpty::check(position, game)?;
        PlayersTurn::check(attempt, game)?;
        Ok(position)
    }
}

// ─────────────────────────────────────────────────────────────
//  Move Contract (Pre + Post)
// ─────────────────────────────────────────────────────────────

/// Contract for move actions.
///
/// Preconditions:
/// - Game not over
/// - Target in bounds
/// - Square empty
/// - Player's turn
///
/// Postconditions:
/// - Ledger grew by exactly one entry and kept its prefix
/// - All state invariants hold
pub struct MoveContract;

impl Contract<GameState, Attempt> for MoveContract {
    type Checked = Position;

    #[instrument(skip(game))]
    fn pre(game: &GameState, attempt: &Attempt) -> Result<Position, Rejection> {
        LegalMove::check(attempt, game).inspect_err(|rejection| {
            debug!(%rejection, "Move rejected");
        })
    }

    fn post(before: &GameState, after: &GameState) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();

        let prior = before.ledger().moves();
        let grown = after.ledger().moves();
        if grown.len() != prior.len() + 1 || &grown[..prior.len()] != prior {
            violations.push(InvariantViolation::new(
                "Ledger is append-only and grows by one per move",
            ));
        }

        if let Err(mut found) = GameStateInvariants::check_all(after) {
            violations.append(&mut found);
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}
