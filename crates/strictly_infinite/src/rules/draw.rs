//! Draw detection.

use super::super::{Board, GameMode, Square};
use super::win::check_winner;
use tracing::instrument;

/// Checks if the board is full (all squares occupied).
pub fn is_full(board: &Board) -> bool {
    board.squares().iter().all(|s| *s != Square::Empty)
}

/// A classic game is drawn when the board fills with no completed line.
///
/// Infinite mode never draws: retirement keeps the board from filling.
#[instrument(skip(board))]
pub fn is_draw(board: &Board, mode: GameMode) -> bool {
    match mode {
        GameMode::Classic => is_full(board) && check_winner(board).is_none(),
        GameMode::Infinite => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Player, Position};

    fn draw_board() -> Board {
        // X O X / O X X / O X O
        let mut board = Board::new();
        let marks = [
            Player::X,
            Player::O,
            Player::X,
            Player::O,
            Player::X,
            Player::X,
            Player::O,
            Player::X,
            Player::O,
        ];
        for (pos, player) in Position::ALL.into_iter().zip(marks) {
            board.set(pos, Square::Occupied(player));
        }
        board
    }

    #[test]
    fn test_empty_board_not_full() {
        assert!(!is_full(&Board::new()));
    }

    #[test]
    fn test_draw_detection() {
        let board = draw_board();
        assert!(is_full(&board));
        assert!(is_draw(&board, GameMode::Classic));
    }

    #[test]
    fn test_infinite_never_draws() {
        assert!(!is_draw(&draw_board(), GameMode::Infinite));
    }

    #[test]
    fn test_not_draw_if_winner() {
        let mut board = draw_board();
        board.set(Position::TopCenter, Square::Occupied(Player::X));
        board.set(Position::BottomCenter, Square::Occupied(Player::X));
        assert!(is_full(&board));
        assert!(!is_draw(&board, GameMode::Classic));
    }
}
