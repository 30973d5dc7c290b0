//! Wire form of [`GameState`].
//!
//! Writing always produces the canonical shape: a nested 3x3 board,
//! `moveHistory` with `{row, col}` positions and RFC 3339 timestamps.
//! Reading also accepts the older shape with a flat board, `moves`,
//! flat-index positions and epoch-millisecond timestamps.
//!
//! A decoded state is never trusted as given. Its history is replayed
//! through the rule engine and the result must agree with every field
//! that was sent; disagreement is an error, not something to repair.

use super::error::{CodecError, CodecErrorKind};
use super::invariants::{GameStateInvariants, InvariantSet};
use super::phases::{GameMode, Outcome};
use super::state::{GameRules, GameState};
use super::{Board, Coordinates, Player, Position, Square};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, instrument, warn};

/// Wire label for a drawn game in the `winner` field.
pub const DRAW_LABEL: &str = "draw";

// ─────────────────────────────────────────────────────────────
//  Canonical shape (write)
// ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CanonicalState {
    board: [[Option<Player>; 3]; 3],
    current_player: Player,
    game_mode: GameMode,
    move_history: Vec<CanonicalMove>,
    winner: Option<String>,
    is_draw: bool,
    is_game_over: bool,
    winning_line: Vec<Coordinates>,
    max_pieces_per_player: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CanonicalMove {
    player: Player,
    position: Coordinates,
    sequence: u32,
    timestamp: DateTime<Utc>,
    retired_position: Option<Coordinates>,
}

impl From<&GameState> for CanonicalState {
    fn from(state: &GameState) -> Self {
        let mut board = [[None; 3]; 3];
        for pos in Position::ALL {
            board[pos.row()][pos.col()] = state.board().get(pos).occupant();
        }

        let move_history = state
            .ledger()
            .iter()
            .map(|m| CanonicalMove {
                player: m.player(),
                position: m.position().into(),
                sequence: m.sequence(),
                timestamp: m.timestamp(),
                retired_position: m.retired().map(Coordinates::from),
            })
            .collect();

        let winner = state.outcome().map(|outcome| match outcome {
            Outcome::Winner(player) => player.to_string(),
            Outcome::Draw => DRAW_LABEL.to_string(),
        });

        Self {
            board,
            current_player: state.side_to_act(),
            game_mode: state.mode(),
            move_history,
            winner,
            is_draw: state.is_draw(),
            is_game_over: state.is_game_over(),
            winning_line: state
                .winning_line()
                .map(|line| line.into_iter().map(Coordinates::from).collect())
                .unwrap_or_default(),
            max_pieces_per_player: state.max_pieces_per_player(),
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  Tolerant shape (read)
// ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomingState {
    board: Option<IncomingBoard>,
    #[serde(alias = "sideToAct")]
    current_player: Option<String>,
    game_mode: Option<String>,
    move_history: Option<Vec<IncomingMove>>,
    moves: Option<Vec<IncomingMove>>,
    winner: Option<String>,
    is_draw: Option<bool>,
    is_game_over: Option<bool>,
    winning_line: Option<Vec<IncomingPosition>>,
    max_pieces_per_player: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IncomingBoard {
    Nested(Vec<Vec<Option<String>>>),
    Flat(Vec<Option<String>>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomingMove {
    player: String,
    position: IncomingPosition,
    sequence: Option<u32>,
    timestamp: Option<IncomingTimestamp>,
    #[serde(alias = "retired", alias = "removedPosition")]
    retired_position: Option<IncomingPosition>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum IncomingPosition {
    Index(i64),
    Pair(Coordinates),
}

impl IncomingPosition {
    fn coordinates(self) -> Coordinates {
        match self {
            // Negative indices stay out of bounds instead of wrapping onto the board.
            IncomingPosition::Index(index) => usize::try_from(index)
                .map_or(Coordinates::new(-1, -1), Coordinates::from_index),
            IncomingPosition::Pair(coords) => coords,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IncomingTimestamp {
    Millis(i64),
    FractionalMillis(f64),
    Text(String),
}

impl IncomingTimestamp {
    fn resolve(&self) -> Result<DateTime<Utc>, CodecError> {
        let parsed = match self {
            IncomingTimestamp::Millis(ms) => DateTime::from_timestamp_millis(*ms),
            IncomingTimestamp::FractionalMillis(ms) if ms.is_finite() => {
                DateTime::from_timestamp_millis(ms.trunc() as i64)
            }
            IncomingTimestamp::FractionalMillis(_) => None,
            IncomingTimestamp::Text(text) => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        };
        parsed.ok_or_else(|| CodecError::invalid("timestamp", format!("{self:?}")))
    }
}

fn parse_player(field: &'static str, text: &str) -> Result<Player, CodecError> {
    Player::from_str(text.trim())
        .map_err(|_| CodecError::invalid(field, format!("unknown player {text:?}")))
}

fn parse_square(text: Option<&str>) -> Result<Square, CodecError> {
    match text.map(str::trim) {
        None | Some("") => Ok(Square::Empty),
        Some(symbol) => parse_player("board", symbol).map(Square::Occupied),
    }
}

fn parse_board(board: IncomingBoard) -> Result<Board, CodecError> {
    let cells: Vec<Option<String>> = match board {
        IncomingBoard::Nested(rows) => {
            if rows.len() != 3 || rows.iter().any(|row| row.len() != 3) {
                return Err(CodecError::invalid("board", "nested board must be 3x3"));
            }
            rows.into_iter().flatten().collect()
        }
        IncomingBoard::Flat(cells) => {
            if cells.len() != 9 {
                return Err(CodecError::invalid(
                    "board",
                    format!("flat board must have 9 cells, got {}", cells.len()),
                ));
            }
            cells
        }
    };

    let mut squares = [Square::Empty; 9];
    for (square, cell) in squares.iter_mut().zip(&cells) {
        *square = parse_square(cell.as_deref())?;
    }
    Ok(Board::from_squares(squares))
}

fn parse_winner(text: Option<&str>) -> Result<Option<Outcome>, CodecError> {
    match text.map(str::trim) {
        None | Some("") => Ok(None),
        Some(label) if label.eq_ignore_ascii_case(DRAW_LABEL) => Ok(Some(Outcome::Draw)),
        Some(symbol) => parse_player("winner", symbol).map(|p| Some(Outcome::Winner(p))),
    }
}

fn resolve_rules(mode: Option<&str>, max_pieces: Option<usize>) -> Result<GameRules, CodecError> {
    let mode = match mode {
        Some(text) => GameMode::from_str(text.trim())
            .map_err(|_| CodecError::invalid("gameMode", format!("unknown mode {text:?}")))?,
        None => match max_pieces {
            Some(max) if max < GameMode::Classic.default_max_pieces() => GameMode::Infinite,
            _ => GameMode::Classic,
        },
    };
    let max = max_pieces.unwrap_or_else(|| mode.default_max_pieces());
    Ok(GameRules::new(mode, max)?)
}

// ─────────────────────────────────────────────────────────────
//  Public API
// ─────────────────────────────────────────────────────────────

/// Serializes a state to its canonical JSON text.
#[instrument(skip(state), fields(moves = state.ledger().len()))]
pub fn serialize(state: &GameState) -> Result<String, CodecError> {
    Ok(serde_json::to_string(&CanonicalState::from(state))?)
}

/// Deserializes a state from canonical or legacy JSON text.
///
/// # Errors
///
/// Fails on malformed JSON, a missing `board` or `currentPlayer`, values
/// that cannot be interpreted, a history the rules refuse, or any field
/// that disagrees with a replay of the history.
#[instrument(skip(text), fields(len = text.len()))]
pub fn deserialize(text: &str) -> Result<GameState, CodecError> {
    let incoming: IncomingState = serde_json::from_str(text)?;

    let board = parse_board(
        incoming
            .board
            .ok_or_else(|| CodecError::new(CodecErrorKind::MissingField("board")))?,
    )?;
    let current_player = parse_player(
        "currentPlayer",
        incoming
            .current_player
            .as_deref()
            .ok_or_else(|| CodecError::new(CodecErrorKind::MissingField("currentPlayer")))?,
    )?;
    let rules = resolve_rules(incoming.game_mode.as_deref(), incoming.max_pieces_per_player)?;

    let moves = match (incoming.move_history, incoming.moves) {
        (Some(history), _) => history,
        (None, Some(legacy)) => {
            debug!("Reading legacy `moves` history");
            legacy
        }
        (None, None) => Vec::new(),
    };

    let starting_player = match moves.first() {
        Some(first) => parse_player("player", &first.player)?,
        None => current_player,
    };

    let mut state = GameState::new(rules, starting_player);
    for (index, incoming_move) in moves.iter().enumerate() {
        let expected_sequence = index as u32 + 1;
        let sequence = incoming_move.sequence.unwrap_or(expected_sequence);
        if sequence != expected_sequence {
            return Err(CodecError::violation(format!(
                "move {} carries sequence {}",
                expected_sequence, sequence
            )));
        }

        let player = parse_player("player", &incoming_move.player)?;
        let timestamp = incoming_move
            .timestamp
            .as_ref()
            .ok_or_else(|| CodecError::new(CodecErrorKind::MissingField("timestamp")))?
            .resolve()?;

        state = state
            .apply_move_at(incoming_move.position.coordinates(), player, timestamp)
            .map_err(|rejection| CodecError::new(CodecErrorKind::Replay { sequence, rejection }))?;

        if let Some(stated) = incoming_move.retired_position {
            let replayed = state.ledger().last().and_then(|m| m.retired());
            if Position::from_coordinates(stated.coordinates()) != replayed {
                return Err(CodecError::violation(format!(
                    "move {} retires {:?} but the oldest live piece was {:?}",
                    sequence,
                    stated.coordinates(),
                    replayed
                )));
            }
        }
    }

    let stated = Stated {
        board,
        current_player,
        outcome: parse_winner(incoming.winner.as_deref())?,
        is_draw: incoming.is_draw,
        is_game_over: incoming.is_game_over,
        winning_line: incoming.winning_line.as_deref(),
    };
    stated.check_against(&state)?;

    GameStateInvariants::check_all(&state).map_err(|violations| {
        let descriptions = violations
            .iter()
            .map(|v| v.description.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        CodecError::violation(descriptions)
    })?;

    debug!(moves = state.ledger().len(), over = state.is_game_over(), "State decoded");
    Ok(state)
}

/// Fields of the wire state that must agree with the replayed history.
struct Stated<'a> {
    board: Board,
    current_player: Player,
    outcome: Option<Outcome>,
    is_draw: Option<bool>,
    is_game_over: Option<bool>,
    winning_line: Option<&'a [IncomingPosition]>,
}

impl Stated<'_> {
    fn check_against(&self, state: &GameState) -> Result<(), CodecError> {
        if *state.board() != self.board {
            warn!("Stated board disagrees with move history");
            return Err(CodecError::violation("board does not match move history"));
        }
        if state.side_to_act() != self.current_player {
            return Err(CodecError::violation(format!(
                "currentPlayer is {} but history leaves {} to act",
                self.current_player,
                state.side_to_act()
            )));
        }
        if let Some(stated) = self.outcome {
            if Some(stated) != state.outcome() {
                return Err(CodecError::violation(format!(
                    "winner is {} but history gives {:?}",
                    stated,
                    state.outcome()
                )));
            }
        }
        if self.is_draw.is_some_and(|flag| flag != state.is_draw()) {
            return Err(CodecError::violation("isDraw disagrees with history"));
        }
        if self.is_game_over.is_some_and(|flag| flag != state.is_game_over()) {
            return Err(CodecError::violation("isGameOver disagrees with history"));
        }
        if let Some(stated) = self.winning_line.filter(|line| !line.is_empty()) {
            let Some(line) = state.winning_line() else {
                return Err(CodecError::violation(
                    "winningLine given for a game without a winner",
                ));
            };
            let consistent = (2..=3).contains(&stated.len())
                && stated.iter().all(|p| {
                    Position::from_coordinates(p.coordinates())
                        .is_some_and(|pos| line.contains(&pos))
                });
            if !consistent {
                return Err(CodecError::violation("winningLine does not match the board"));
            }
        }
        Ok(())
    }
}
