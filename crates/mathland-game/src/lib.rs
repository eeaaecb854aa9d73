//! Math Adventure Land game core
//!
//! Generates problem batches through a text-generation service and runs the
//! session, round, and summary flow of the mini-games.

pub mod catalog;
pub mod config;
pub mod error;
pub mod flow;
pub mod generator;
pub mod problem;
pub mod prompt;
pub mod round;
pub mod session;
pub mod timer;

pub use catalog::{ClassLevel, GameConfig, GameMode, ModeInfo, Operation, GAME_MODES, ROUND_CHOICES};
pub use config::{GameDefaults, Provider, Settings, SETTINGS_FILE_NAME};
pub use error::{FailureKind, GameError, GenerationError, Result};
pub use flow::{GameFlow, Phase};
pub use generator::{parse_batch, ProblemGenerator, RetryPolicy};
pub use problem::{normalize_question, Problem, OPTION_COUNT, QUESTION_SUFFIX};
pub use round::{
    answer_mode_for, AnswerMode, Choice, FreeEntry, MultipleChoice, RejectedInput, RoundDriver,
    RoundView, CHOICE_LABELS,
};
pub use session::{Feedback, Outcome, Progress, RoundRecord, Session, SessionStatus};
pub use timer::{DwellElapsed, DwellTimer};
