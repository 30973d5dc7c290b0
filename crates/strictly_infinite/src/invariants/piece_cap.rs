//! Piece cap invariant: no side holds more live pieces than allowed.

use super::super::{GameState, Player};
use super::Invariant;

/// Invariant: each side's live pieces never exceed the cap.
///
/// Checked against both the board and the ledger's view of live pieces.
pub struct PieceCapInvariant;

impl Invariant<GameState> for PieceCapInvariant {
    fn holds(game: &GameState) -> bool {
        let cap = game.max_pieces_per_player();
        [Player::X, Player::O].into_iter().all(|player| {
            game.board().live_count(player) <= cap && game.ledger().live_pieces(player).len() <= cap
        })
    }

    fn description() -> &'static str {
        "Live pieces per player never exceed the piece cap"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Position, Square};

    #[test]
    fn test_empty_game_holds() {
        assert!(PieceCapInvariant::holds(&GameState::infinite()));
    }

    #[test]
    fn test_extra_piece_violates() {
        let mut game = GameState::infinite();
        for pos in [Position::TopLeft, Position::Center, Position::BottomRight, Position::TopRight] {
            game.board.set(pos, Square::Occupied(Player::X));
        }
        assert!(!PieceCapInvariant::holds(&game));
    }
}
