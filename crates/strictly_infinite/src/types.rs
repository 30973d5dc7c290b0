//! Core domain types for infinite-mode tic-tac-toe.

use super::position::Position;
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Player in the game.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Player {
    /// Player X.
    X,
    /// Player O.
    O,
}

impl Player {
    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }
}

/// A square on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Square {
    /// Empty square.
    Empty,
    /// Square occupied by a player.
    Occupied(Player),
}

impl Square {
    /// Returns the occupant, if any.
    pub fn occupant(self) -> Option<Player> {
        match self {
            Square::Empty => None,
            Square::Occupied(player) => Some(player),
        }
    }
}

/// A (row, column) pair as it arrives from outside the engine.
///
/// Signed so that negative wire values survive long enough to be
/// reported as out of bounds instead of failing to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, new)]
pub struct Coordinates {
    /// Row, 0 at the top.
    pub row: i64,
    /// Column, 0 at the left.
    pub col: i64,
}

impl Coordinates {
    /// True iff both row and column lie in `0..=2`.
    pub fn is_in_bounds(self) -> bool {
        (0..3).contains(&self.row) && (0..3).contains(&self.col)
    }

    /// Converts a flat index to coordinates (`row = index / 3`).
    ///
    /// Indices past 8 produce coordinates that are out of bounds.
    pub fn from_index(index: usize) -> Self {
        let index = index as i64;
        Self {
            row: index / 3,
            col: index % 3,
        }
    }

    /// Flat index `row * 3 + col`, or `None` when out of bounds.
    pub fn to_index(self) -> Option<usize> {
        self.is_in_bounds()
            .then(|| (self.row * 3 + self.col) as usize)
    }
}

impl From<Position> for Coordinates {
    fn from(position: Position) -> Self {
        Self {
            row: position.row() as i64,
            col: position.col() as i64,
        }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// 3x3 board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    /// Squares in row-major order (0-8).
    squares: [Square; 9],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self {
            squares: [Square::Empty; 9],
        }
    }

    /// Builds a board from row-major squares.
    pub fn from_squares(squares: [Square; 9]) -> Self {
        Self { squares }
    }

    /// Gets the square at the given position.
    pub fn get(&self, pos: Position) -> Square {
        self.squares[pos.to_index()]
    }

    /// Sets the square at the given position.
    pub fn set(&mut self, pos: Position, square: Square) {
        self.squares[pos.to_index()] = square;
    }

    /// Checks if a square is empty.
    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos) == Square::Empty
    }

    /// True iff the coordinates are on the board and the square there is empty.
    #[instrument(skip(self))]
    pub fn is_valid_move(&self, target: Coordinates) -> bool {
        Position::from_coordinates(target).is_some_and(|pos| self.is_empty(pos))
    }

    /// Returns all squares as a slice.
    pub fn squares(&self) -> &[Square; 9] {
        &self.squares
    }

    /// Number of squares occupied by `player`.
    pub fn live_count(&self, player: Player) -> usize {
        self.squares
            .iter()
            .filter(|s| **s == Square::Occupied(player))
            .count()
    }

    /// Formats the board as a human-readable string.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                let pos = row * 3 + col;
                let symbol = match self.squares[pos] {
                    Square::Empty => pos.to_string(),
                    Square::Occupied(player) => player.to_string(),
                };
                result.push_str(&symbol);
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push_str("\n-+-+-\n");
            }
        }
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
