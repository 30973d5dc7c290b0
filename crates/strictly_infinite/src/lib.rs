//! Strictly Infinite - tic-tac-toe with a finite piece supply
//!
//! A pure game engine for classic and infinite-mode tic-tac-toe. In
//! infinite mode each side may hold only a few pieces; placing one more
//! retires that side's oldest live piece, so the board never fills.
//!
//! # Architecture
//!
//! - **Board**: 3x3 grid, [`Position`] and [`Coordinates`] addressing
//! - **Ledger**: append-only record of every [`Move`]
//! - **Rules**: move validation, retirement, win and draw detection
//! - **Advisor**: depth-limited minimax with alpha-beta pruning
//! - **Codec**: canonical JSON out, canonical or legacy JSON in
//!
//! # Example
//!
//! ```
//! use strictly_infinite::{Advisor, GameState, Player, Position};
//!
//! let state = GameState::infinite()
//!     .apply_move(Position::Center, Player::X)
//!     .expect("legal move");
//!
//! let reply = Advisor::for_mode(state.mode()).recommend(&state);
//! assert!(reply.is_some());
//!
//! let text = strictly_infinite::serialize(&state).expect("serializable");
//! assert_eq!(strictly_infinite::deserialize(&text).expect("decodes"), state);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod action;
mod advisor;
mod error;
mod ledger;
mod phases;
mod position;
mod state;
mod types;

// Public module declarations
pub mod codec;
pub mod contracts;
pub mod invariants;
pub mod rules;

// Crate-level exports - Board model
pub use position::Position;
pub use types::{Board, Coordinates, Player, Square};

// Crate-level exports - Moves and ledger
pub use action::{Move, Rejection};
pub use ledger::Ledger;

// Crate-level exports - Rule engine
pub use phases::{GameMode, Outcome};
pub use rules::{LINES, WinningLine};
pub use state::{GameRules, GameState};

// Crate-level exports - Search
pub use advisor::{
    Advisor, DEFAULT_CLASSIC_DEPTH, DEFAULT_INFINITE_DEPTH, ScoredMove, SearchStats, WIN_SCORE,
};

// Crate-level exports - Codec and errors
pub use codec::{deserialize, serialize};
pub use error::{CodecError, CodecErrorKind, RulesError};
