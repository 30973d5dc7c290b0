//! Strictly Arena - sessions, configuration and CLI for strictly_infinite
//!
//! The engine crate is pure: it neither stores games nor picks who starts.
//! This crate supplies those collaborators.
//!
//! # Architecture
//!
//! - **Config**: TOML game setup with defaults per mode
//! - **Policy**: fixed or random starting side
//! - **Session**: seats, locked move submission, recommendations
//!
//! # Example
//!
//! ```
//! use strictly_arena::{ArenaConfig, SeatKind, SessionManager, StartingPolicy};
//! use strictly_infinite::Player;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ArenaConfig::from_toml("mode = \"infinite\"")?
//!     .with_starting_player(StartingPolicy::Fixed(Player::X));
//!
//! let manager = SessionManager::new();
//! let game = manager.create_session("demo".into(), config.rules()?, *config.starting_player())?;
//! manager.register_player(&game, "alice".into(), "Alice".into(), SeatKind::Human)?;
//! let state = manager.submit_move(&game, "alice", 4)?;
//! assert!(manager.recommend(&state, Some(1))?.is_some());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod policy;
mod session;

// Crate-level exports - Configuration
pub use config::{ArenaConfig, ConfigError};

// Crate-level exports - Starting side
pub use policy::{PolicyParseError, StartingPolicy};

// Crate-level exports - Session management
pub use session::{
    GameId, GameSession, MAX_ASYNC_DEPTH, PlayerId, Seat, SeatKind, SessionError, SessionManager,
};
