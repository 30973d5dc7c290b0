//! Ledger consistency invariant: the board is what the ledger says it is.

use super::super::{Board, GameState, Square};
use super::Invariant;

/// Invariant: replaying the ledger reproduces the board.
///
/// Sequence numbers start at 1 and strictly increase. Every retirement
/// removes a piece of the mover's own that is on the board, and every
/// placement lands on an empty square.
pub struct LedgerConsistentInvariant;

impl Invariant<GameState> for LedgerConsistentInvariant {
    fn holds(game: &GameState) -> bool {
        let mut reconstructed = Board::new();
        let mut last_sequence = 0;

        for mov in game.ledger() {
            if mov.sequence() <= last_sequence {
                return false;
            }
            last_sequence = mov.sequence();

            if let Some(retired) = mov.retired() {
                if reconstructed.get(retired) != Square::Occupied(mov.player()) {
                    return false;
                }
                reconstructed.set(retired, Square::Empty);
            }

            if !reconstructed.is_empty(mov.position()) {
                return false;
            }
            reconstructed.set(mov.position(), Square::Occupied(mov.player()));
        }

        reconstructed == *game.board()
    }

    fn description() -> &'static str {
        "Board matches a replay of the move ledger"
    }
}
