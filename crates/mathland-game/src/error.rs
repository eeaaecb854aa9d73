//! Error types for Math Adventure Land.
//!
//! Configuration loading, problem generation, and game-flow transitions all
//! report through [`GameError`]. Problem generation has its own
//! [`GenerationError`] because the player only ever sees one message for it,
//! whatever went wrong underneath.

use std::path::PathBuf;

use mathland_genai::ErrorKind;

use crate::catalog::GameMode;
use crate::round::RejectedInput;

/// A specialized `Result` type for game operations.
pub type Result<T> = std::result::Result<T, GameError>;

/// Errors that can occur while configuring or running a game.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid JSON syntax in the settings file.
    #[error("Invalid JSON in settings file '{path}': {message}\n\nSuggestion: Validate your mathland.json with a JSON linter")]
    ConfigParseError {
        /// Path to the settings file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// Settings or game configuration failed validation.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    ConfigValidationError {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },

    /// The selected game mode is a placeholder that cannot be played yet.
    #[error("{mode} is coming soon and cannot be played yet\n\nSuggestion: Choose Treasure Hunt or Balloon Pop")]
    ModeUnavailable {
        /// The disabled mode.
        mode: GameMode,
    },

    // ========================================================================
    // Generation Errors
    // ========================================================================
    /// Problem generation failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// A generation request is already in flight for this game.
    #[error("Problems are already being generated; please wait")]
    GenerationPending,

    // ========================================================================
    // State Machine Errors
    // ========================================================================
    /// Invalid state transition attempted.
    #[error("Invalid state transition: cannot go from {from} to {to}")]
    InvalidStateTransition {
        /// The current state.
        from: String,
        /// The attempted target state.
        to: String,
    },

    /// A session was started with the wrong number of problems.
    #[error("Expected {expected} problems but received {actual}")]
    ProblemCountMismatch {
        /// Rounds requested by the configuration.
        expected: usize,
        /// Problems actually supplied.
        actual: usize,
    },

    /// Input during a multiple-choice round selected nothing.
    #[error(transparent)]
    RejectedInput(#[from] RejectedInput),

}

impl GameError {
    /// Creates a new `ConfigParseError` with the given path and message.
    #[must_use]
    pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ConfigValidationError` with the given message and suggestion.
    #[must_use]
    pub fn config_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::ConfigValidationError {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Creates a new `InvalidStateTransition` error.
    #[must_use]
    pub fn invalid_transition(from: impl std::fmt::Display, to: impl std::fmt::Display) -> Self {
        Self::InvalidStateTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Returns `true` if the player can simply try again from the
    /// configuration screen.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Generation(err) => err.is_retryable(),
            Self::GenerationPending => true,
            _ => false,
        }
    }
}

/// Why a generation attempt was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The game configuration cannot be turned into a request.
    InvalidConfig,
    /// The text-generation service failed.
    Upstream(ErrorKind),
    /// The service answered with text that is not the expected JSON.
    Malformed,
    /// The JSON parsed but violates the problem schema.
    Schema,
    /// The batch does not contain exactly the requested number of problems.
    Count,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidConfig => write!(f, "invalid_config"),
            Self::Upstream(kind) => write!(f, "upstream_{kind}"),
            Self::Malformed => write!(f, "malformed"),
            Self::Schema => write!(f, "schema"),
            Self::Count => write!(f, "count"),
        }
    }
}

/// The single error surfaced when a batch of problems cannot be produced.
///
/// The display text is the same for every cause; [`detail`](Self::detail)
/// carries the diagnostic for logs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Failed to generate math problems. The AI model might be busy. Please try again.")]
pub struct GenerationError {
    kind: FailureKind,
    detail: String,
}

impl GenerationError {
    /// Creates a new generation error.
    #[must_use]
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// Creates a `Malformed` error.
    #[must_use]
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::new(FailureKind::Malformed, detail)
    }

    /// Creates a `Schema` error.
    #[must_use]
    pub fn schema(detail: impl Into<String>) -> Self {
        Self::new(FailureKind::Schema, detail)
    }

    /// Returns what went wrong.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        self.kind
    }

    /// Returns the diagnostic detail.
    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Returns `true` if asking the service again may produce a valid batch.
    ///
    /// Bad batches are worth regenerating; bad credentials and bad
    /// configurations are not.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self.kind {
            FailureKind::InvalidConfig => false,
            FailureKind::Upstream(kind) => kind.is_transient(),
            FailureKind::Malformed | FailureKind::Schema | FailureKind::Count => true,
        }
    }
}

impl From<mathland_genai::GenaiError> for GenerationError {
    fn from(err: mathland_genai::GenaiError) -> Self {
        Self::new(FailureKind::Upstream(err.kind()), err.to_string())
    }
}
