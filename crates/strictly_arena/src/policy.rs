//! Who moves first in a new game.

use derive_more::Display;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strictly_infinite::Player;
use tracing::{debug, instrument};

/// Rule for picking the starting side of a new game.
///
/// The engine always takes the starting side as an argument; randomness
/// lives here so that replays stay deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StartingPolicy {
    /// Always the same side.
    #[display("{}", _0)]
    Fixed(Player),
    /// A fair coin flip per game.
    #[default]
    #[display("random")]
    Random,
}

impl StartingPolicy {
    /// Picks the starting side using the thread-local generator.
    pub fn resolve(self) -> Player {
        self.resolve_with(&mut rand::rng())
    }

    /// Picks the starting side using `rng`.
    #[instrument(skip(rng))]
    pub fn resolve_with<R: Rng + ?Sized>(self, rng: &mut R) -> Player {
        let player = match self {
            StartingPolicy::Fixed(player) => player,
            StartingPolicy::Random if rng.random_bool(0.5) => Player::X,
            StartingPolicy::Random => Player::O,
        };
        debug!(%player, "Starting side chosen");
        player
    }
}

/// Unrecognised starting policy text.
#[derive(Debug, Clone, PartialEq, Eq, Display, derive_more::Error)]
#[display("Unknown starting policy {:?}, expected x, o or random", text)]
pub struct PolicyParseError {
    /// Text that failed to parse.
    pub text: String,
}

impl FromStr for StartingPolicy {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("random") {
            return Ok(StartingPolicy::Random);
        }
        Player::from_str(trimmed)
            .map(StartingPolicy::Fixed)
            .map_err(|_| PolicyParseError {
                text: s.to_string(),
            })
    }
}

impl TryFrom<String> for StartingPolicy {
    type Error = PolicyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StartingPolicy> for String {
    fn from(policy: StartingPolicy) -> Self {
        policy.to_string().to_lowercase()
    }
}
