//! Arena configuration loaded from TOML.

use crate::policy::StartingPolicy;
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use strictly_infinite::{Advisor, GameMode, GameRules};
use tracing::{debug, info, instrument};

/// How new games are set up and how deep the advisor looks.
///
/// ```toml
/// mode = "infinite"
/// max_pieces_per_player = 3
/// starting_player = "random"
/// advisor_depth = 6
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct ArenaConfig {
    /// Game mode for new games.
    #[serde(default)]
    mode: GameMode,

    /// Piece cap; the mode's default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[setters(strip_option)]
    max_pieces_per_player: Option<usize>,

    /// Who moves first.
    #[serde(default)]
    starting_player: StartingPolicy,

    /// Advisor search depth; the mode's default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[setters(strip_option)]
    advisor_depth: Option<u32>,
}

impl ArenaConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(mode = %config.mode, starting = %config.starting_player, "Config loaded");
        Ok(config)
    }

    /// Parses configuration from TOML text and checks the rules it names.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.rules()?;
        Ok(config)
    }

    /// Rules for new games.
    #[instrument(skip(self))]
    pub fn rules(&self) -> Result<GameRules, ConfigError> {
        let max = self
            .max_pieces_per_player
            .unwrap_or_else(|| self.mode.default_max_pieces());
        GameRules::new(self.mode, max).map_err(|e| ConfigError::new(e.to_string()))
    }

    /// Advisor at the configured depth, or the mode's default.
    pub fn advisor(&self) -> Advisor {
        self.advisor_depth
            .map_or_else(|| Advisor::for_mode(self.mode), Advisor::new)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strictly_infinite::{DEFAULT_CLASSIC_DEPTH, Player};

    #[test]
    fn test_empty_toml_is_classic() {
        let config = ArenaConfig::from_toml("").expect("defaults");
        assert_eq!(config.mode(), &GameMode::Classic);
        assert_eq!(config.rules().expect("rules"), GameRules::classic());
        assert_eq!(config.advisor().depth(), DEFAULT_CLASSIC_DEPTH);
    }

    #[test]
    fn test_full_toml() {
        let config = ArenaConfig::from_toml(
            r#"
            mode = "infinite"
            max_pieces_per_player = 4
            starting_player = "o"
            advisor_depth = 5
            "#,
        )
        .expect("valid config");

        assert_eq!(config.rules().expect("rules").max_pieces_per_player(), 4);
        assert_eq!(config.starting_player(), &StartingPolicy::Fixed(Player::O));
        assert_eq!(config.advisor().depth(), 5);
    }

    #[test]
    fn test_unplayable_cap_is_rejected() {
        let err = ArenaConfig::from_toml("mode = \"infinite\"\nmax_pieces_per_player = 8")
            .unwrap_err();
        assert!(err.message.contains("infinite"));
    }

    #[test]
    fn test_setters_override() {
        let config = ArenaConfig::default()
            .with_mode(GameMode::Infinite)
            .with_advisor_depth(2);
        assert_eq!(config.rules().expect("rules"), GameRules::infinite());
        assert_eq!(config.advisor().depth(), 2);
    }
}
