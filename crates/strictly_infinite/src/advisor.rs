//! Minimax move advisor with alpha-beta pruning.
//!
//! Every candidate is explored through [`GameState::apply_move_at`], so
//! retirement, win and draw behave exactly as in a real game. Scores are
//! from the point of view of the side to act at the root.

use super::phases::{GameMode, Outcome};
use super::state::GameState;
use super::{Player, Position};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Search depth that solves classic games completely.
pub const DEFAULT_CLASSIC_DEPTH: u32 = 9;

/// Search depth used for infinite games, which never run out of moves.
pub const DEFAULT_INFINITE_DEPTH: u32 = 6;

/// Base value of a decided game; remaining depth is added on top.
pub const WIN_SCORE: i32 = 10;

/// A root move with its minimax value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredMove {
    /// Where the side to act would play.
    pub position: Position,
    /// Minimax value for the side to act.
    pub score: i32,
}

/// Counters from one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// States visited, root children included.
    pub nodes: u64,
    /// Branches abandoned because `beta <= alpha`.
    pub cutoffs: u64,
}

/// Recommends moves for whichever side is to act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisor {
    depth: u32,
}

impl Advisor {
    /// Advisor searching `depth` plies.
    pub fn new(depth: u32) -> Self {
        Self { depth }
    }

    /// Advisor with the default depth for `mode`.
    pub fn for_mode(mode: GameMode) -> Self {
        match mode {
            GameMode::Classic => Self::new(DEFAULT_CLASSIC_DEPTH),
            GameMode::Infinite => Self::new(DEFAULT_INFINITE_DEPTH),
        }
    }

    /// Plies searched.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Best move for the side to act, or `None` when there is no legal move.
    ///
    /// Equal scores resolve to the first move in row-major order. With a
    /// depth of 0 nothing is scored and the first legal move is returned.
    #[instrument(skip(self, state), fields(depth = self.depth, side = %state.side_to_act()))]
    pub fn recommend(&self, state: &GameState) -> Option<Position> {
        self.recommend_with_stats(state).0
    }

    /// [`Advisor::recommend`], also returning search counters.
    pub fn recommend_with_stats(&self, state: &GameState) -> (Option<Position>, SearchStats) {
        let candidates = state.available_moves();
        let mut search = Search::new(state);

        if self.depth == 0 {
            return (candidates.first().copied(), search.stats);
        }

        let mut alpha = i32::MIN;
        let mut best: Option<ScoredMove> = None;
        for position in candidates {
            let Some(child) = search.child(state, position) else {
                continue;
            };
            let score = search.minimax(&child, self.depth - 1, alpha, i32::MAX);
            if best.is_none_or(|b| score > b.score) {
                best = Some(ScoredMove { position, score });
            }
            alpha = alpha.max(score);
        }

        debug!(
            best = ?best,
            nodes = search.stats.nodes,
            cutoffs = search.stats.cutoffs,
            "Search finished"
        );
        (best.map(|b| b.position), search.stats)
    }

    /// Exact minimax value of every legal move, row-major.
    ///
    /// Each root move gets a full window, so values are comparable
    /// across moves. Empty when the depth is 0 or the game is over.
    #[instrument(skip(self, state), fields(depth = self.depth, side = %state.side_to_act()))]
    pub fn evaluate(&self, state: &GameState) -> Vec<ScoredMove> {
        if self.depth == 0 {
            return Vec::new();
        }
        let mut search = Search::new(state);
        state
            .available_moves()
            .into_iter()
            .filter_map(|position| {
                let child = search.child(state, position)?;
                let score = search.minimax(&child, self.depth - 1, i32::MIN, i32::MAX);
                Some(ScoredMove { position, score })
            })
            .collect()
    }
}

impl Default for Advisor {
    fn default() -> Self {
        Self::for_mode(GameMode::Classic)
    }
}

struct Search {
    maximizer: Player,
    timestamp: DateTime<Utc>,
    stats: SearchStats,
}

impl Search {
    fn new(root: &GameState) -> Self {
        Self {
            maximizer: root.side_to_act(),
            // Explored moves never leave the search; any fixed time will do.
            timestamp: root
                .ledger()
                .last()
                .map_or(DateTime::<Utc>::UNIX_EPOCH, |m| m.timestamp()),
            stats: SearchStats::default(),
        }
    }

    fn child(&mut self, state: &GameState, position: Position) -> Option<GameState> {
        self.stats.nodes += 1;
        state
            .apply_move_at(position, state.side_to_act(), self.timestamp)
            .ok()
    }

    fn terminal_score(&self, outcome: Outcome, remaining: u32) -> i32 {
        let bonus = remaining as i32;
        match outcome.winner() {
            Some(winner) if winner == self.maximizer => WIN_SCORE + bonus,
            Some(_) => -WIN_SCORE - bonus,
            None => 0,
        }
    }

    fn minimax(&mut self, state: &GameState, remaining: u32, mut alpha: i32, mut beta: i32) -> i32 {
        if let Some(outcome) = state.outcome() {
            return self.terminal_score(outcome, remaining);
        }
        if remaining == 0 {
            return 0;
        }
        let moves = state.available_moves();
        if moves.is_empty() {
            return 0;
        }

        let maximizing = state.side_to_act() == self.maximizer;
        let mut best = if maximizing { i32::MIN } else { i32::MAX };
        for position in moves {
            let Some(child) = self.child(state, position) else {
                continue;
            };
            let value = self.minimax(&child, remaining - 1, alpha, beta);
            if maximizing {
                best = best.max(value);
                alpha = alpha.max(best);
            } else {
                best = best.min(value);
                beta = beta.min(best);
            }
            if beta <= alpha {
                self.stats.cutoffs += 1;
                break;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Coordinates, GameRules};

    fn play(mut state: GameState, indices: &[usize]) -> GameState {
        for &index in indices {
            let player = state.side_to_act();
            state = state
                .apply_move(Coordinates::from_index(index), player)
                .expect("legal move");
        }
        state
    }

    #[test]
    fn test_takes_immediate_win() {
        // X: 0, 1. O: 4, 8. X to act.
        let state = play(GameState::classic(), &[0, 4, 1, 8]);
        for depth in 1..=5 {
            assert_eq!(Advisor::new(depth).recommend(&state), Some(Position::TopRight));
        }
    }

    #[test]
    fn test_blocks_as_second_player() {
        // X: 2, 4 threatens 6. O: 0. O to act.
        let state = play(GameState::classic(), &[2, 0, 4]);
        assert_eq!(state.side_to_act(), Player::O);
        assert_eq!(Advisor::new(2).recommend(&state), Some(Position::BottomLeft));
    }

    #[test]
    fn test_depth_zero_returns_first_legal() {
        let state = play(GameState::classic(), &[0, 4]);
        assert_eq!(Advisor::new(0).recommend(&state), Some(Position::TopCenter));
        assert!(Advisor::new(0).evaluate(&state).is_empty());
    }

    #[test]
    fn test_none_when_over() {
        let state = play(GameState::classic(), &[0, 3, 1, 4, 2]);
        assert!(state.is_game_over());
        assert_eq!(Advisor::new(4).recommend(&state), None);
    }

    #[test]
    fn test_faster_win_scores_higher() {
        let state = play(GameState::classic(), &[0, 4, 1, 8]);
        let scores = Advisor::new(3).evaluate(&state);
        let win = scores
            .iter()
            .find(|s| s.position == Position::TopRight)
            .expect("scored");
        assert_eq!(win.score, WIN_SCORE + 2);
        assert!(scores.iter().all(|s| s.score <= win.score));
    }

    #[test]
    fn test_perfect_play_from_empty_is_draw() {
        let scores = Advisor::default().evaluate(&GameState::classic());
        assert_eq!(scores.len(), 9);
        assert!(scores.iter().all(|s| s.score <= 0));
        assert!(scores.iter().any(|s| s.score == 0));
    }

    #[test]
    fn test_pruning_agrees_with_full_window() {
        let state = play(GameState::classic(), &[4, 0]);
        let advisor = Advisor::new(6);
        let best = advisor.recommend(&state).expect("move");
        let scores = advisor.evaluate(&state);
        let top = scores.iter().map(|s| s.score).max().expect("scores");
        let first_top = scores.iter().find(|s| s.score == top).expect("top");
        assert_eq!(best, first_top.position);
    }

    #[test]
    fn test_infinite_search_does_not_mutate_root() {
        let state = play(
            GameState::new(GameRules::infinite(), Player::X),
            &[0, 4, 1, 8, 5, 7],
        );
        let before = state.clone();
        let (best, stats) = Advisor::for_mode(GameMode::Infinite).recommend_with_stats(&state);
        assert!(best.is_some());
        assert!(stats.nodes > 0);
        assert_eq!(state, before);
    }

    #[test]
    fn test_infinite_blocks_line_that_survives_retirement() {
        // X: 0, 1, 5. O: 4, 8, 7 threatens 6-7-8. O's next piece retires
        // 4, which is not on that line, so X has to block at 6.
        let state = play(GameState::infinite(), &[0, 4, 1, 8, 5, 7]);
        assert_eq!(Advisor::new(2).recommend(&state), Some(Position::BottomLeft));
    }
}
