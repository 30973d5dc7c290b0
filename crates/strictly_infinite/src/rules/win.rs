//! Win detection.

use super::super::{Board, Player, Position, Square};
use tracing::instrument;

/// One of the eight winning triples, in canonical order.
pub type WinningLine = [Position; 3];

/// All winning triples: rows, columns, then diagonals.
pub const LINES: [WinningLine; 8] = [
    // Rows
    [Position::TopLeft, Position::TopCenter, Position::TopRight],
    [Position::MiddleLeft, Position::Center, Position::MiddleRight],
    [Position::BottomLeft, Position::BottomCenter, Position::BottomRight],
    // Columns
    [Position::TopLeft, Position::MiddleLeft, Position::BottomLeft],
    [Position::TopCenter, Position::Center, Position::BottomCenter],
    [Position::TopRight, Position::MiddleRight, Position::BottomRight],
    // Diagonals
    [Position::TopLeft, Position::Center, Position::BottomRight],
    [Position::TopRight, Position::Center, Position::BottomLeft],
];

fn owner(board: &Board, [a, b, c]: WinningLine) -> Option<Player> {
    let sq = board.get(a);
    match sq {
        Square::Occupied(player) if sq == board.get(b) && sq == board.get(c) => Some(player),
        _ => None,
    }
}

/// Checks every triple; returns the winner and the first completed line.
#[instrument(skip(board))]
pub fn check_winner(board: &Board) -> Option<(Player, WinningLine)> {
    LINES
        .iter()
        .find_map(|line| owner(board, *line).map(|player| (player, *line)))
}

/// Checks only the triples through `placed`.
///
/// After a single placement this agrees with [`check_winner`], since
/// no other triple changed.
pub fn check_winner_through(board: &Board, placed: Position) -> Option<(Player, WinningLine)> {
    LINES
        .iter()
        .filter(|line| line.contains(&placed))
        .find_map(|line| owner(board, *line).map(|player| (player, *line)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(player: Player, positions: &[Position]) -> Board {
        let mut board = Board::new();
        for pos in positions {
            board.set(*pos, Square::Occupied(player));
        }
        board
    }

    #[test]
    fn test_no_winner_empty_board() {
        assert_eq!(check_winner(&Board::new()), None);
    }

    #[test]
    fn test_every_line_detected() {
        for line in LINES {
            let board = board_with(Player::O, &line);
            assert_eq!(check_winner(&board), Some((Player::O, line)));
            for pos in line {
                assert_eq!(check_winner_through(&board, pos), Some((Player::O, line)));
            }
        }
    }

    #[test]
    fn test_winner_top_row() {
        let board = board_with(
            Player::X,
            &[Position::TopLeft, Position::TopCenter, Position::TopRight],
        );
        assert_eq!(check_winner(&board), Some((Player::X, LINES[0])));
    }

    #[test]
    fn test_no_winner_incomplete_or_mixed() {
        let mut board = board_with(Player::X, &[Position::TopLeft, Position::TopCenter]);
        assert_eq!(check_winner(&board), None);
        board.set(Position::TopRight, Square::Occupied(Player::O));
        assert_eq!(check_winner(&board), None);
    }

    #[test]
    fn test_through_ignores_unrelated_lines() {
        let board = board_with(
            Player::X,
            &[Position::BottomLeft, Position::BottomCenter, Position::BottomRight],
        );
        assert_eq!(check_winner_through(&board, Position::TopRight), None);
    }
}
