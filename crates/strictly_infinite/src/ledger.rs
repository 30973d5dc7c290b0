//! Append-only move ledger.
//!
//! The ledger is the sole source of retirement order. A piece is live
//! until a later move by the same player names its position as retired;
//! since only one piece can sit on a square at a time, replaying the
//! ledger in sequence order with one queue per player recovers exactly
//! which placements are still on the board.

use super::action::Move;
use super::{Player, Position};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::instrument;

/// Ordered record of every move applied to a game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ledger {
    moves: Vec<Move>,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new ledger with `mov` appended; `self` is left untouched.
    #[must_use]
    pub fn append(&self, mov: Move) -> Self {
        let mut moves = Vec::with_capacity(self.moves.len() + 1);
        moves.extend_from_slice(&self.moves);
        moves.push(mov);
        Self { moves }
    }

    /// Sequence number the next appended move must carry.
    pub fn next_sequence(&self) -> u32 {
        self.moves.last().map_or(1, |m| m.sequence() + 1)
    }

    /// All moves in sequence order.
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Number of moves ever applied, retired or not.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// True when no move has been applied.
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Most recent move.
    pub fn last(&self) -> Option<&Move> {
        self.moves.last()
    }

    /// Iterates moves in sequence order.
    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.moves.iter()
    }

    /// Live pieces of `player`, oldest first.
    #[instrument(skip(self), fields(moves = self.moves.len()))]
    pub fn live_pieces(&self, player: Player) -> Vec<&Move> {
        let mut live: VecDeque<&Move> = VecDeque::new();
        for mov in self.moves.iter().filter(|m| m.player() == player) {
            if let Some(retired) = mov.retired() {
                live.retain(|m| m.position() != retired);
            }
            live.push_back(mov);
        }
        live.into_iter().collect()
    }

    /// Position of `player`'s lowest-sequence live piece, if they have any.
    pub fn oldest_live_position(&self, player: Player) -> Option<Position> {
        self.live_pieces(player).first().map(|m| m.position())
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}
