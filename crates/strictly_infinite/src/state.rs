//! Game state and the move transition.
//!
//! A [`GameState`] is a value: [`GameState::apply_move`] never touches
//! `self` and hands back the successor, so a state can be shared across
//! readers while a new one is computed. Once an outcome is recorded the
//! state accepts no further moves.

use super::action::{Move, Rejection};
use super::contracts::{Attempt, Contract, MoveContract};
use super::error::RulesError;
use super::ledger::Ledger;
use super::phases::{GameMode, Outcome};
use super::rules::{WinningLine, check_winner_through, is_draw};
use super::{Board, Coordinates, Player, Position, Square};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Mode plus the per-side piece cap it is played with.
///
/// Deserializing goes through [`GameRules::new`], so an unplayable cap
/// never reaches a [`GameState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRules")]
pub struct GameRules {
    mode: GameMode,
    max_pieces_per_player: usize,
}

/// Unchecked wire form of [`GameRules`].
#[derive(Deserialize)]
struct RawRules {
    mode: GameMode,
    max_pieces_per_player: usize,
}

impl TryFrom<RawRules> for GameRules {
    type Error = RulesError;

    fn try_from(raw: RawRules) -> Result<Self, Self::Error> {
        GameRules::new(raw.mode, raw.max_pieces_per_player)
    }
}

impl GameRules {
    /// Validates a mode and piece cap.
    ///
    /// Classic games use a cap of 9. Infinite games accept 3 or 4: fewer
    /// makes a line impossible, more lets the board fill up.
    pub fn new(mode: GameMode, max_pieces_per_player: usize) -> Result<Self, RulesError> {
        let supported = match mode {
            GameMode::Classic => max_pieces_per_player == 9,
            GameMode::Infinite => (3..=4).contains(&max_pieces_per_player),
        };
        if !supported {
            return Err(RulesError::UnsupportedPieceCap {
                mode,
                max: max_pieces_per_player,
            });
        }
        Ok(Self {
            mode,
            max_pieces_per_player,
        })
    }

    /// Rules with the mode's default cap.
    pub fn for_mode(mode: GameMode) -> Self {
        Self {
            mode,
            max_pieces_per_player: mode.default_max_pieces(),
        }
    }

    /// Classic tic-tac-toe.
    pub fn classic() -> Self {
        Self::for_mode(GameMode::Classic)
    }

    /// Infinite mode with three pieces per side.
    pub fn infinite() -> Self {
        Self::for_mode(GameMode::Infinite)
    }

    /// The mode.
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Live pieces a side may hold before the oldest is retired.
    pub fn max_pieces_per_player(&self) -> usize {
        self.max_pieces_per_player
    }
}

impl Default for GameRules {
    fn default() -> Self {
        Self::classic()
    }
}

/// Complete game state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameState {
    pub(crate) board: Board,
    pub(crate) side_to_act: Player,
    pub(crate) rules: GameRules,
    pub(crate) ledger: Ledger,
    pub(crate) outcome: Option<Outcome>,
    pub(crate) winning_line: Option<WinningLine>,
}

impl GameState {
    /// Creates a fresh game with `starting_player` to act.
    #[instrument]
    pub fn new(rules: GameRules, starting_player: Player) -> Self {
        Self {
            board: Board::new(),
            side_to_act: starting_player,
            rules,
            ledger: Ledger::new(),
            outcome: None,
            winning_line: None,
        }
    }

    /// Fresh classic game, X to act.
    pub fn classic() -> Self {
        Self::new(GameRules::classic(), Player::X)
    }

    /// Fresh infinite game, X to act.
    pub fn infinite() -> Self {
        Self::new(GameRules::infinite(), Player::X)
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Side whose move is currently legal. After the game ends this is
    /// the side that made the final move.
    pub fn side_to_act(&self) -> Player {
        self.side_to_act
    }

    /// Rules the game is played under.
    pub fn rules(&self) -> GameRules {
        self.rules
    }

    /// Game mode.
    pub fn mode(&self) -> GameMode {
        self.rules.mode()
    }

    /// Per-side piece cap.
    pub fn max_pieces_per_player(&self) -> usize {
        self.rules.max_pieces_per_player()
    }

    /// Every move applied so far.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Terminal outcome, if the game is over.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Winner, if any.
    pub fn winner(&self) -> Option<Player> {
        self.outcome.and_then(|o| o.winner())
    }

    /// True when a classic game filled up without a line.
    pub fn is_draw(&self) -> bool {
        self.outcome.is_some_and(|o| o.is_draw())
    }

    /// True iff there is a winner or a draw.
    pub fn is_game_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// The completed triple, when the game was won.
    pub fn winning_line(&self) -> Option<WinningLine> {
        self.winning_line
    }

    /// Positions of `player`'s live pieces, oldest first.
    pub fn live_pieces(&self, player: Player) -> Vec<Position> {
        self.ledger
            .live_pieces(player)
            .into_iter()
            .map(|m| m.position())
            .collect()
    }

    /// Legal targets for the side to act, row-major. Empty once over.
    pub fn available_moves(&self) -> Vec<Position> {
        if self.is_game_over() {
            return Vec::new();
        }
        Position::valid_moves(&self.board)
    }

    /// Applies a move stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns a [`Rejection`] naming why the move was refused; `self`
    /// is unchanged either way.
    pub fn apply_move(
        &self,
        target: impl Into<Coordinates>,
        player: Player,
    ) -> Result<GameState, Rejection> {
        self.apply_move_at(target, player, Utc::now())
    }

    /// Applies a move with an explicit timestamp.
    ///
    /// In infinite mode, a side already holding its cap first loses its
    /// oldest live piece; the new move records that position as retired.
    #[instrument(skip(self, target, timestamp), fields(player = %player, sequence = self.ledger.next_sequence()))]
    pub fn apply_move_at(
        &self,
        target: impl Into<Coordinates>,
        player: Player,
        timestamp: DateTime<Utc>,
    ) -> Result<GameState, Rejection> {
        let attempt = Attempt::new(player, target.into());
        let position = MoveContract::pre(self, &attempt)?;

        let mut board = self.board.clone();
        let at_cap = self.ledger.live_pieces(player).len() >= self.rules.max_pieces_per_player();
        let retired = if at_cap {
            self.ledger.oldest_live_position(player)
        } else {
            None
        };
        if let Some(retired) = retired {
            debug!(retired = %retired, "Retiring oldest piece");
            board.set(retired, Square::Empty);
        }
        board.set(position, Square::Occupied(player));

        let mov = Move::new(
            player,
            position,
            self.ledger.next_sequence(),
            timestamp,
            retired,
        );
        let ledger = self.ledger.append(mov);

        let (outcome, winning_line) = match check_winner_through(&board, position) {
            Some((winner, line)) => (Some(Outcome::Winner(winner)), Some(line)),
            None if is_draw(&board, self.rules.mode()) => (Some(Outcome::Draw), None),
            None => (None, None),
        };
        let side_to_act = if outcome.is_some() {
            player
        } else {
            player.opponent()
        };

        let next = GameState {
            board,
            side_to_act,
            rules: self.rules,
            ledger,
            outcome,
            winning_line,
        };

        debug_assert!(
            MoveContract::post(self, &next).is_ok(),
            "Move broke game invariants"
        );

        if let Some(outcome) = outcome {
            debug!(%outcome, sequence = mov.sequence(), "Game finished");
        }
        Ok(next)
    }

    /// Rebuilds a state by applying `moves` in order to a fresh game.
    ///
    /// # Errors
    ///
    /// Returns the zero-based index of the first refused move alongside
    /// the rejection.
    #[instrument(skip(moves))]
    pub fn replay<I>(
        rules: GameRules,
        starting_player: Player,
        moves: I,
    ) -> Result<GameState, (usize, Rejection)>
    where
        I: IntoIterator<Item = (Player, Coordinates, DateTime<Utc>)>,
    {
        let mut state = GameState::new(rules, starting_player);
        for (index, (player, target, at)) in moves.into_iter().enumerate() {
            state = state
                .apply_move_at(target, player, at)
                .map_err(|rejection| (index, rejection))?;
        }
        Ok(state)
    }
}
