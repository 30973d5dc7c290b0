//! Error types for rules configuration and state decoding.

use super::{GameMode, Rejection};
use derive_more::{Display, Error};
use tracing::instrument;

/// Rule configuration that cannot produce a playable game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RulesError {
    /// The piece cap is not supported by the mode.
    #[display("{} mode does not support {} pieces per player", mode, max)]
    UnsupportedPieceCap {
        /// Mode requested.
        mode: GameMode,
        /// Cap requested.
        max: usize,
    },
}

impl std::error::Error for RulesError {}

/// Classification of a decode failure.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum CodecErrorKind {
    /// The text is not valid JSON, or has the wrong shape.
    #[display("Malformed state: {}", _0)]
    Malformed(String),

    /// A field with no documented default is absent.
    #[display("Missing required field `{}`", _0)]
    MissingField(&'static str),

    /// A field is present but its value cannot be interpreted.
    #[display("Invalid value for `{}`: {}", field, message)]
    InvalidField {
        /// Wire name of the field.
        field: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// Mode and piece cap do not describe a playable game.
    #[display("{}", _0)]
    Rules(RulesError),

    /// A recorded move is illegal when replayed.
    #[display("Move {} cannot be replayed: {}", sequence, rejection)]
    Replay {
        /// Sequence number of the offending move.
        sequence: u32,
        /// Why the engine refused it.
        rejection: Rejection,
    },

    /// The decoded state contradicts itself.
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(String),
}

/// State codec error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Codec error: {} at {}:{}", kind, file, line)]
pub struct CodecError {
    /// What went wrong.
    pub kind: CodecErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl CodecError {
    /// Creates a new codec error with caller location tracking.
    #[track_caller]
    #[instrument(skip(kind))]
    pub fn new(kind: CodecErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Shorthand for [`CodecErrorKind::InvalidField`].
    #[track_caller]
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::new(CodecErrorKind::InvalidField {
            field,
            message: message.into(),
        })
    }

    /// Shorthand for [`CodecErrorKind::InvariantViolation`].
    #[track_caller]
    pub fn violation(message: impl Into<String>) -> Self {
        Self::new(CodecErrorKind::InvariantViolation(message.into()))
    }
}

impl From<serde_json::Error> for CodecError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(CodecErrorKind::Malformed(err.to_string()))
    }
}

impl From<RulesError> for CodecError {
    #[track_caller]
    fn from(err: RulesError) -> Self {
        Self::new(CodecErrorKind::Rules(err))
    }
}
