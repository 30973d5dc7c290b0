//! First-class move records and move rejections.
//!
//! Moves are domain events, not side effects. Once recorded in the
//! ledger they never change; a move that forced a retirement carries
//! the vacated position with it.

use super::{Coordinates, Player, Position};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A placed piece, as recorded in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    player: Player,
    position: Position,
    sequence: u32,
    timestamp: DateTime<Utc>,
    retired: Option<Position>,
}

impl Move {
    /// Creates a new move record.
    pub fn new(
        player: Player,
        position: Position,
        sequence: u32,
        timestamp: DateTime<Utc>,
        retired: Option<Position>,
    ) -> Self {
        Self {
            player,
            position,
            sequence,
            timestamp,
            retired,
        }
    }

    /// Returns the player making this move.
    pub fn player(&self) -> Player {
        self.player
    }

    /// Returns the position of this move.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Sequence number, starting at 1 and strictly increasing per game.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// When the move was applied.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Position of the same player's piece this move retired, if any.
    pub fn retired(&self) -> Option<Position> {
        self.retired
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} {} -> {}", self.sequence, self.player, self.position.label())?;
        if let Some(retired) = self.retired {
            write!(f, " (retired {})", retired.label())?;
        }
        Ok(())
    }
}

/// Why a move was not applied. The state is unchanged in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Rejection {
    /// The game is already over.
    #[display("Game is already over")]
    GameOver,

    /// The target is not on the board.
    #[display("Position {} is out of bounds", _0)]
    OutOfBounds(Coordinates),

    /// The square at the position is already occupied.
    #[display("Square {:?} is already occupied", _0)]
    Occupied(Position),

    /// It's not this player's turn.
    #[display("It's not {}'s turn, {} is to act", actual, expected)]
    WrongTurn {
        /// Side that is to act.
        expected: Player,
        /// Side that attempted the move.
        actual: Player,
    },
}

impl std::error::Error for Rejection {}
