//! Game sessions: seats, move submission and recommendations.
//!
//! The engine trusts the state it is handed, so every write to a game
//! goes through [`SessionManager`], which holds the lock for the whole
//! read-apply-store cycle.

use crate::policy::StartingPolicy;
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use strictly_infinite::{
    Advisor, CodecError, Coordinates, DEFAULT_CLASSIC_DEPTH, GameRules, GameState, Player,
    Rejection, deserialize, serialize,
};
use tracing::{debug, info, instrument, warn};

/// Deepest search [`SessionManager::recommend_async`] will start.
///
/// A classic game never lasts more than nine plies, so nothing is lost there.
pub const MAX_ASYNC_DEPTH: u32 = DEFAULT_CLASSIC_DEPTH;

/// Unique identifier for a game.
pub type GameId = String;

/// Unique identifier for a participant.
pub type PlayerId = String;

/// Who sits in a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatKind {
    /// A person submitting moves.
    Human,
    /// The built-in advisor.
    Advisor,
}

/// A participant holding one side of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    /// Participant's unique ID.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Human or advisor.
    pub kind: SeatKind,
    /// Side this participant plays.
    pub side: Player,
}

/// Why a session operation failed.
#[derive(Debug, Clone, Display, From)]
pub enum SessionError {
    /// No game with this ID.
    #[display("Game {} not found", _0)]
    GameNotFound(GameId),

    /// A game with this ID already exists.
    #[display("Game {} already exists", _0)]
    GameExists(GameId),

    /// Both seats are taken.
    #[display("Game already has 2 players")]
    SessionFull,

    /// The participant holds no seat in this game.
    #[display("Player {} is not seated in this game", _0)]
    UnknownPlayer(PlayerId),

    /// The engine refused the move.
    #[display("Invalid move: {}", _0)]
    #[from]
    Rejected(Rejection),

    /// A serialized state could not be read.
    #[display("{}", _0)]
    #[from]
    Codec(CodecError),

    /// The advisor did not answer in time.
    #[display("Recommendation timed out after {:?}", _0)]
    TimedOut(Duration),

    /// The search task failed to complete.
    #[display("Recommendation task failed: {}", _0)]
    SearchFailed(String),

    /// Another thread panicked while holding the session table.
    #[display("Session table is poisoned")]
    Poisoned,
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Rejected(rejection) => Some(rejection),
            SessionError::Codec(err) => Some(err),
            _ => None,
        }
    }
}

/// One game and the two seats around it.
#[derive(Debug, Clone)]
pub struct GameSession {
    /// Game ID.
    pub id: GameId,
    /// Current state.
    pub state: GameState,
    /// Seat playing X.
    pub player_x: Option<Seat>,
    /// Seat playing O.
    pub player_o: Option<Seat>,
}

impl GameSession {
    /// Creates a session around a fresh game.
    #[instrument(skip(rules))]
    pub fn new(id: GameId, rules: GameRules, starting_player: Player) -> Self {
        info!(game_id = %id, mode = %rules.mode(), %starting_player, "Creating game session");
        Self {
            id,
            state: GameState::new(rules, starting_player),
            player_x: None,
            player_o: None,
        }
    }

    /// Seats a participant in the first free side, X before O.
    #[instrument(skip(self), fields(game_id = %self.id))]
    pub fn register_player(
        &mut self,
        id: PlayerId,
        name: String,
        kind: SeatKind,
    ) -> Result<Player, SessionError> {
        let side = if self.player_x.is_none() {
            Player::X
        } else if self.player_o.is_none() {
            Player::O
        } else {
            warn!(player_id = %id, "Game already has 2 players");
            return Err(SessionError::SessionFull);
        };

        info!(player_id = %id, %side, "Seating player");
        let seat = Some(Seat {
            id,
            name,
            kind,
            side,
        });
        match side {
            Player::X => self.player_x = seat,
            Player::O => self.player_o = seat,
        }
        Ok(side)
    }

    /// Gets the seat held by `player_id`.
    pub fn seat(&self, player_id: &str) -> Option<&Seat> {
        [self.player_x.as_ref(), self.player_o.as_ref()]
            .into_iter()
            .flatten()
            .find(|seat| seat.id == player_id)
    }

    /// Seat whose side is to act.
    pub fn seat_to_act(&self) -> Option<&Seat> {
        match self.state.side_to_act() {
            Player::X => self.player_x.as_ref(),
            Player::O => self.player_o.as_ref(),
        }
    }

    /// Plays `index` for the participant's side and returns the new
    /// state, serialized.
    ///
    /// The stored state only changes when the engine accepts the move.
    #[instrument(skip(self), fields(game_id = %self.id))]
    pub fn submit_move(&mut self, player_id: &str, index: usize) -> Result<String, SessionError> {
        let side = self
            .seat(player_id)
            .map(|seat| seat.side)
            .ok_or_else(|| {
                warn!(player_id, "Unknown player attempted move");
                SessionError::UnknownPlayer(player_id.to_string())
            })?;

        let next = self
            .state
            .apply_move(Coordinates::from_index(index), side)
            .inspect_err(|rejection| {
                warn!(player_id, index, %rejection, "Move rejected");
            })?;
        let serialized = serialize(&next)?;
        self.state = next;

        info!(
            player_id,
            index,
            over = self.state.is_game_over(),
            "Move completed successfully"
        );
        Ok(serialized)
    }

    /// Starts a new game with the same rules and seats.
    #[instrument(skip(self), fields(game_id = %self.id))]
    pub fn reset(&mut self, policy: StartingPolicy) {
        let starting_player = policy.resolve();
        self.state = GameState::new(self.state.rules(), starting_player);
        info!(%starting_player, "Game reset");
    }
}

/// Manages all game sessions.
#[derive(Debug, Clone, Default)]
pub struct SessionManager {
    sessions: Arc<Mutex<HashMap<GameId, GameSession>>>,
    advisor_depth: Option<u32>,
}

impl SessionManager {
    /// Creates an empty manager whose advisor uses each mode's default depth.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating session manager");
        Self::default()
    }

    /// Caps recommendations at `depth` when the caller gives none.
    pub fn with_advisor_depth(mut self, depth: u32) -> Self {
        self.advisor_depth = Some(depth);
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<GameId, GameSession>>, SessionError> {
        self.sessions.lock().map_err(|_| {
            warn!("Session table lock poisoned");
            SessionError::Poisoned
        })
    }

    /// Creates a game, resolving who starts from `policy`.
    #[instrument(skip(self, rules))]
    pub fn create_session(
        &self,
        id: GameId,
        rules: GameRules,
        policy: StartingPolicy,
    ) -> Result<GameId, SessionError> {
        let mut sessions = self.lock()?;
        if sessions.contains_key(&id) {
            warn!(game_id = %id, "Game already exists");
            return Err(SessionError::GameExists(id));
        }

        let session = GameSession::new(id.clone(), rules, policy.resolve());
        sessions.insert(id.clone(), session);
        Ok(id)
    }

    /// Gets a snapshot of a session.
    #[instrument(skip(self))]
    pub fn get_session(&self, id: &str) -> Result<Option<GameSession>, SessionError> {
        let session = self.lock()?.get(id).cloned();
        if session.is_none() {
            debug!(game_id = id, "Game not found");
        }
        Ok(session)
    }

    /// Removes a session, returning it if it existed.
    #[instrument(skip(self))]
    pub fn remove_session(&self, id: &str) -> Result<Option<GameSession>, SessionError> {
        let removed = self.lock()?.remove(id);
        if removed.is_some() {
            info!(game_id = id, "Game removed");
        }
        Ok(removed)
    }

    /// Lists all game IDs.
    #[instrument(skip(self))]
    pub fn list_sessions(&self) -> Result<Vec<GameId>, SessionError> {
        let ids: Vec<_> = self.lock()?.keys().cloned().collect();
        debug!(count = ids.len(), "Listed games");
        Ok(ids)
    }

    /// Seats a participant while holding the lock.
    #[instrument(skip(self))]
    pub fn register_player(
        &self,
        game_id: &str,
        player_id: PlayerId,
        name: String,
        kind: SeatKind,
    ) -> Result<Player, SessionError> {
        let mut sessions = self.lock()?;
        sessions
            .get_mut(game_id)
            .ok_or_else(|| SessionError::GameNotFound(game_id.to_string()))?
            .register_player(player_id, name, kind)
    }

    /// Applies a move while holding the lock, so concurrent submissions
    /// for one game are applied one after another.
    #[instrument(skip(self))]
    pub fn submit_move(
        &self,
        game_id: &str,
        player_id: &str,
        index: usize,
    ) -> Result<String, SessionError> {
        let mut sessions = self.lock()?;
        sessions
            .get_mut(game_id)
            .ok_or_else(|| SessionError::GameNotFound(game_id.to_string()))?
            .submit_move(player_id, index)
    }

    /// Restarts a game in place.
    #[instrument(skip(self))]
    pub fn reset_session(&self, game_id: &str, policy: StartingPolicy) -> Result<(), SessionError> {
        let mut sessions = self.lock()?;
        sessions
            .get_mut(game_id)
            .ok_or_else(|| SessionError::GameNotFound(game_id.to_string()))?
            .reset(policy);
        Ok(())
    }

    /// Recommends a flat index for the side to act in a serialized state.
    ///
    /// `None` when the game is over. Without an explicit `depth` the
    /// manager's depth applies, then the mode's default.
    #[instrument(skip(self, serialized))]
    pub fn recommend(
        &self,
        serialized: &str,
        depth: Option<u32>,
    ) -> Result<Option<usize>, SessionError> {
        recommend_serialized(serialized, depth.or(self.advisor_depth))
    }

    /// [`SessionManager::recommend`] on the blocking pool, abandoned
    /// after `limit`.
    ///
    /// The search itself cannot be cancelled: after a timeout it runs to
    /// completion on its blocking thread and the result is dropped. The
    /// depth is clamped to [`MAX_ASYNC_DEPTH`] so that leftover work stays
    /// bounded.
    #[instrument(skip(self, serialized))]
    pub async fn recommend_async(
        &self,
        serialized: String,
        depth: Option<u32>,
        limit: Duration,
    ) -> Result<Option<usize>, SessionError> {
        let depth = clamp_async_depth(depth.or(self.advisor_depth));
        let task = tokio::task::spawn_blocking(move || recommend_serialized(&serialized, depth));

        match tokio::time::timeout(limit, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(SessionError::SearchFailed(join_error.to_string())),
            Err(_) => {
                warn!(?limit, "Recommendation timed out");
                Err(SessionError::TimedOut(limit))
            }
        }
    }
}

fn clamp_async_depth(depth: Option<u32>) -> Option<u32> {
    depth.map(|requested| {
        if requested > MAX_ASYNC_DEPTH {
            debug!(requested, max = MAX_ASYNC_DEPTH, "Clamping async search depth");
        }
        requested.min(MAX_ASYNC_DEPTH)
    })
}

fn recommend_serialized(serialized: &str, depth: Option<u32>) -> Result<Option<usize>, SessionError> {
    let state = deserialize(serialized)?;
    let advisor = depth.map_or_else(|| Advisor::for_mode(state.mode()), Advisor::new);
    let index = advisor.recommend(&state).map(|position| position.to_index());
    debug!(depth = advisor.depth(), ?index, "Recommendation ready");
    Ok(index)
}
