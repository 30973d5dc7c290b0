//! Alternating turn invariant: sides take turns.

use super::super::GameState;
use super::Invariant;

/// Invariant: consecutive moves come from opposite sides.
///
/// While the game runs, the side to act is the opponent of the last
/// mover. Once it ends, the side to act stays on the last mover.
pub struct AlternatingTurnInvariant;

impl Invariant<GameState> for AlternatingTurnInvariant {
    fn holds(game: &GameState) -> bool {
        let moves = game.ledger().moves();

        if moves
            .windows(2)
            .any(|pair| pair[0].player() == pair[1].player())
        {
            return false;
        }

        match moves.last() {
            None => !game.is_game_over(),
            Some(last) if game.is_game_over() => game.side_to_act() == last.player(),
            Some(last) => game.side_to_act() == last.player().opponent(),
        }
    }

    fn description() -> &'static str {
        "Players alternate turns"
    }
}
