//! Outcome consistency invariant: the recorded result matches the board.

use super::super::rules::{check_winner, is_draw};
use super::super::{GameState, Outcome};
use super::Invariant;

/// Invariant: winner, draw flag and winning line agree with the board.
///
/// A won game's line is the first completed triple and belongs to the
/// last mover; a running game has no completed triple.
pub struct OutcomeConsistentInvariant;

impl Invariant<GameState> for OutcomeConsistentInvariant {
    fn holds(game: &GameState) -> bool {
        let board = game.board();
        let last_mover = game.ledger().last().map(|m| m.player());

        match (game.outcome(), check_winner(board)) {
            (Some(Outcome::Winner(winner)), Some((owner, line))) => {
                winner == owner
                    && Some(winner) == last_mover
                    && game.winning_line() == Some(line)
            }
            (Some(Outcome::Draw), None) => {
                is_draw(board, game.mode()) && game.winning_line().is_none()
            }
            (None, None) => !is_draw(board, game.mode()) && game.winning_line().is_none(),
            _ => false,
        }
    }

    fn description() -> &'static str {
        "Outcome and winning line agree with the board"
    }
}
